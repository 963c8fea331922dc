use crate::controller::ApiResponse;
use crate::error::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::notification::{self as NotificationApi, NewNotification};
use service::AppState;

use log::*;

/// POST create a notification and push it to its recipients
///
/// The response carries the notification with its dispatch status.
pub async fn send(
    State(app_state): State<AppState>,
    Json(new_notification): Json<NewNotification>,
) -> Result<impl IntoResponse> {
    debug!("POST Send a new Notification from: {new_notification:?}");

    let notification = NotificationApi::send(
        &app_state.sse_manager,
        app_state.recipient_resolver.as_ref(),
        &app_state.id_generator,
        new_notification,
    )
    .await?;

    debug!("Sent Notification: {notification:?}");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), notification)),
    ))
}

/// POST create and push several notifications at once
pub async fn send_batch(
    State(app_state): State<AppState>,
    Json(new_notifications): Json<Vec<NewNotification>>,
) -> Result<impl IntoResponse> {
    debug!(
        "POST Send a batch of {} Notification(s)",
        new_notifications.len()
    );

    let notifications = NotificationApi::send_batch(
        &app_state.sse_manager,
        app_state.recipient_resolver.as_ref(),
        &app_state.id_generator,
        new_notifications,
    )
    .await?;

    info!("Sent a batch of {} Notification(s)", notifications.len());

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), notifications)),
    ))
}

#[cfg(test)]
mod tests {
    use crate::router::define_routes;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use clap::Parser;
    use serde_json::{json, Value};
    use service::{config::Config, AppState};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_state() -> AppState {
        let config =
            Config::try_parse_from(["notification-push", "--role-members", "7=100,101"]).unwrap();
        AppState::new(config)
    }

    async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Option<Value>) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).ok())
    }

    fn user_notification(target_id: i64) -> Value {
        json!({
            "title": "Password reminder",
            "content": "Your password expires in 3 days",
            "type": "SECURITY",
            "level": "WARNING",
            "targetType": "USER",
            "targetId": target_id
        })
    }

    #[tokio::test]
    async fn send_to_offline_user_returns_sent_notification() {
        let (status, body) = post(
            define_routes(app_state()),
            "/notifications",
            user_notification(100),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let body = body.unwrap();
        assert_eq!(body["status_code"], 201);
        assert_eq!(body["data"]["status"], "SENT");
        assert_eq!(body["data"]["type"], "SECURITY");
        assert_eq!(body["data"]["targetId"], 100);
        assert_eq!(body["data"]["read"], false);
        assert!(body["data"]["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn send_pushes_to_subscribed_user() {
        let app_state = app_state();
        let mut subscription = app_state.sse_manager.subscribe("100".to_string());
        subscription.next_frame().await.unwrap();

        let (_, body) = post(
            define_routes(app_state.clone()),
            "/notifications",
            user_notification(100),
        )
        .await;

        let frame = subscription.next_frame().await.unwrap();
        let body = body.unwrap();
        assert_eq!(frame.event_type, "notification");
        assert_eq!(frame.id, body["data"]["id"].to_string());
    }

    #[tokio::test]
    async fn send_with_blank_title_is_unprocessable() {
        let mut notification = user_notification(100);
        notification["title"] = json!("   ");

        let (status, _) = post(define_routes(app_state()), "/notifications", notification).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn send_to_unknown_role_is_not_found() {
        let notification = json!({
            "title": "Maintenance",
            "content": "Scheduled maintenance tonight",
            "type": "SYSTEM",
            "level": "INFO",
            "targetType": "ROLE",
            "targetId": 999
        });

        let (status, _) = post(define_routes(app_state()), "/notifications", notification).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn send_to_role_reaches_every_member() {
        let app_state = app_state();
        let mut first = app_state.sse_manager.subscribe("100".to_string());
        let mut second = app_state.sse_manager.subscribe("101".to_string());
        first.next_frame().await.unwrap();
        second.next_frame().await.unwrap();

        let notification = json!({
            "title": "New feature",
            "content": "Dark mode is available",
            "type": "FEATURE",
            "level": "INFO",
            "targetType": "ROLE",
            "targetId": 7
        });
        let (_, body) = post(
            define_routes(app_state.clone()),
            "/notifications",
            notification,
        )
        .await;

        assert_eq!(body.unwrap()["data"]["status"], "SENT");
        assert_eq!(first.next_frame().await.unwrap().event_type, "notification");
        assert_eq!(second.next_frame().await.unwrap().event_type, "notification");
    }

    #[tokio::test]
    async fn send_batch_returns_every_notification() {
        let batch = json!([user_notification(100), user_notification(101)]);

        let (status, body) = post(define_routes(app_state()), "/notifications/batch", batch).await;

        assert_eq!(status, StatusCode::CREATED);
        let data = body.unwrap()["data"].clone();
        let notifications = data.as_array().unwrap();
        assert_eq!(notifications.len(), 2);
        assert_ne!(notifications[0]["id"], notifications[1]["id"]);
    }

    #[tokio::test]
    async fn send_batch_with_one_invalid_entry_sends_nothing() {
        let app_state = app_state();
        let mut subscription = app_state.sse_manager.subscribe("100".to_string());
        subscription.next_frame().await.unwrap();

        let mut invalid = user_notification(101);
        invalid["content"] = json!("");
        let batch = json!([user_notification(100), invalid]);

        let (status, _) = post(
            define_routes(app_state.clone()),
            "/notifications/batch",
            batch,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let pushed =
            tokio::time::timeout(Duration::from_millis(50), subscription.next_frame()).await;
        assert!(pushed.is_err(), "nothing should be pushed: {pushed:?}");
    }
}
