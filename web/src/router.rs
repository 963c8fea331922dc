use crate::controller::{health_check_controller, notification_controller};
use crate::sse::handler::sse_handler;
use axum::{
    routing::{get, post},
    Router,
};
use service::AppState;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(notification_routes(app_state.clone()))
        .merge(sse_routes(app_state))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn notification_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/notifications", post(notification_controller::send))
        .route(
            "/notifications/batch",
            post(notification_controller::send_batch),
        )
        .with_state(app_state)
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/notifications/sse/:user_id", get(sse_handler))
        .with_state(app_state)
}
