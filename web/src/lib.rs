use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use log::*;
use service::AppState;
use ::sse::Manager;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod controller;
pub mod error;
pub mod router;
mod sse;

/// Binds the configured address and serves the API until Ctrl-C, at which
/// point every live SSE connection is completed so the server can drain.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let address = app_state.config.bind_address();
    let cors_layer = cors_layer(&app_state.config.allowed_origins);
    let sse_manager = app_state.sse_manager.clone();

    let listener = TcpListener::bind(&address).await?;
    info!("Server starting... listening for connections on http://{address}");

    axum::serve(listener, router::define_routes(app_state).layer(cors_layer))
        .with_graceful_shutdown(shutdown_signal(sse_manager))
        .await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid allowed origin {origin:?}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(origins)
}

async fn shutdown_signal(sse_manager: Arc<Manager>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for the shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    info!("Shutdown signal received, closing SSE connections");
    sse_manager.shutdown();
}
