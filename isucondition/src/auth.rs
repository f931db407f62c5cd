use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::rest::AppError;

/// Header set by the fronting auth layer once the session is verified.
pub const USER_ID_HEADER: &str = "x-jia-user-id";

/// Signed-in user, taken from [`USER_ID_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiaUserId(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for JiaUserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| JiaUserId(value.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}
