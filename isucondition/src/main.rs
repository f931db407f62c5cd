use axum::{routing::get, Router};
use isucondition::config::Config;
use isucondition::rest::AppState;
use isucondition::{batching, db, metrics, rest, static_assets};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting isucondition");
    info!("HTTP server: {}", config.http_addr);
    info!("Database: {}", config.database_host());
    info!("Frontend: {}", config.frontend_dir.display());

    if let Err(e) = metrics::init_metrics() {
        error!("Failed to register metrics: {}", e);
        std::process::exit(1);
    }

    let pool = match db::make_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // Bounded queue between the condition endpoint and the batcher
    info!("Channel capacity: {}", config.channel_capacity);
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));

    let batcher_pool = pool.clone();
    let (batch_size, batch_timeout_ms) = (config.batch_size.max(1), config.batch_timeout_ms);
    let batcher_handle = tokio::spawn(async move {
        batching::run_batcher(rx, batcher_pool, batch_size, batch_timeout_ms).await;
    });

    let state = AppState {
        pool,
        tx,
        condition_limit: config.condition_limit,
    };
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .merge(rest::create_router(state))
        .merge(static_assets::router(&config.frontend_dir));

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to bind to {}: {}", config.http_addr, e);
            std::process::exit(1);
        });

    info!("HTTP server listening on {}", config.http_addr);

    // The router owns the only queue sender; once serve returns, the batcher
    // sees the queue close and flushes what is left.
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("HTTP server error: {}", e);
    }

    info!("HTTP server stopped, draining condition queue");
    if let Err(e) = batcher_handle.await {
        error!("Batcher task failed: {}", e);
    }

    info!("Shutting down");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

async fn metrics_handler() -> String {
    metrics::gather_metrics()
}
