use async_stream::stream;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use domain::Id;
use futures::Stream;
use log::*;
use service::AppState;
use std::convert::Infallible;

/// Opens the notification stream for `user_id`.
///
/// The first event is the `connected` greeting. A later subscription for the
/// same user ends this stream. Dropping the response (client disconnect)
/// completes the connection and removes it from the registry.
pub(crate) async fn sse_handler(
    Path(user_id): Path<Id>,
    State(app_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Establishing SSE connection for user {user_id}");

    let mut subscription = app_state.sse_manager.subscribe(user_id.to_string());
    if let Some(timeout) = app_state.config.sse_connection_timeout() {
        subscription = subscription.with_timeout(timeout);
    }

    let stream = stream! {
        while let Some(frame) = subscription.next_frame().await {
            yield Ok(Event::from(frame));
        }

        debug!(
            "SSE stream for user {} ended: {}",
            user_id,
            subscription.handle().state()
        );
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(app_state.config.sse_keep_alive()))
}
