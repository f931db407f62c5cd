use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Client-side routes of the single page frontend.
const FRONTEND_PATHS: [&str; 5] = [
    "/",
    "/isu/:jia_isu_uuid",
    "/isu/:jia_isu_uuid/condition",
    "/isu/:jia_isu_uuid/graph",
    "/register",
];

pub fn router(frontend_dir: &Path) -> Router {
    let index = frontend_dir.join("index.html");

    FRONTEND_PATHS.iter().fold(
        Router::new().nest_service("/assets", ServeDir::new(frontend_dir.join("assets"))),
        |router, path| router.route_service(path, ServeFile::new(&index)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::fs;
    use tower::ServiceExt;

    #[test]
    fn test_frontend_routes_serve_index() {
        tokio_test::block_on(async {
            let dir = std::env::temp_dir()
                .join(format!("isucondition-static-{}", std::process::id()));
            fs::create_dir_all(dir.join("assets")).unwrap();
            fs::write(dir.join("index.html"), "<html>isu</html>").unwrap();
            fs::write(dir.join("assets").join("app.js"), "console.log(1)").unwrap();

            for uri in ["/", "/register", "/isu/abc/graph", "/assets/app.js"] {
                let response = router(&dir)
                    .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            }

            let response = router(&dir)
                .oneshot(Request::builder().uri("/isu/abc").body(Body::empty()).unwrap())
                .await
                .unwrap();
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&body[..], b"<html>isu</html>");

            let _ = fs::remove_dir_all(&dir);
        });
    }
}
