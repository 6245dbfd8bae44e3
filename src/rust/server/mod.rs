//! HTTP surface of the prediction service.

mod error;
mod handlers;

use std::future::Future;
use std::io;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;
use crate::service::PredictionService;

pub use error::{ApiError, MODEL_NOT_LOADED_DETAIL};

/// Routes every endpoint onto `service`.
pub fn build_router(service: Arc<PredictionService>, cors: bool) -> Router {
    let router = Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .route("/api/options", get(handlers::options))
        .route("/api/example", get(handlers::example))
        .route("/api/predict", post(handlers::predict))
        .route("/api/predict/batch", post(handlers::predict_batch))
        .with_state(service);

    if cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Serves `router` on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, router: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: &ServerConfig, service: PredictionService) -> io::Result<()> {
    let router = build_router(Arc::new(service), config.cors);
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Listening on {} ({})", listener.local_addr()?, config.public_url());

    serve_on(listener, router, shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            log::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
