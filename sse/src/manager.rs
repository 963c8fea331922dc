use crate::connection::{CompletionReason, ConnectionHandle, Sink, UserId};
use crate::lifecycle::{Lifecycle, Subscription};
use crate::message::Frame;
use crate::registry::SubscriptionRegistry;
use entity::notifications::Model as Notification;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Result of one best-effort delivery attempt to one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Written to the user's live connection
    Delivered,
    /// The user has no live connection; the notification is dropped
    NoActiveConnection,
    /// The write failed and the connection was torn down
    DeliveryFailed,
}

pub struct Manager {
    registry: Arc<SubscriptionRegistry>,
    lifecycle: Arc<Lifecycle>,
}

impl Manager {
    pub fn new() -> Self {
        let registry = Arc::new(SubscriptionRegistry::new());
        let lifecycle = Arc::new(Lifecycle::new(registry.clone()));
        Self {
            registry,
            lifecycle,
        }
    }

    /// Opens a channel-backed connection for `user_id`, replacing any
    /// connection the user already has, and greets it.
    pub fn subscribe(&self, user_id: UserId) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel::<Frame>();
        let handle = self.lifecycle.establish(user_id, Box::new(tx));
        info!(
            "Registered new SSE connection {} for user {}",
            handle.id(),
            handle.user_id()
        );

        let subscription = Subscription::new(handle, self.lifecycle.clone(), rx);
        let greeting = Frame::connected().map_err(|e| e.to_string()).and_then(|frame| {
            subscription
                .handle()
                .send(frame)
                .map_err(|e| e.to_string())
        });
        if let Err(e) = greeting {
            warn!("Failed to greet SSE connection: {e}");
            subscription.fail(e);
        }

        subscription
    }

    /// Registers a connection over a caller-supplied sink.
    ///
    /// The caller owns the returned handle and must report its transport's
    /// terminal events through [`Manager::lifecycle`].
    pub fn attach(&self, user_id: UserId, sink: Box<dyn Sink>) -> Arc<ConnectionHandle> {
        self.lifecycle.establish(user_id, sink)
    }

    /// Delivers a notification to one user's live connection, if any.
    pub fn publish(&self, user_id: &str, notification: &Notification) -> DeliveryOutcome {
        self.deliver(user_id, &Frame::notification(notification))
    }

    /// Delivers to each user independently; outcomes are in `user_ids` order.
    pub fn publish_to_set(
        &self,
        user_ids: &[UserId],
        notification: &Notification,
    ) -> Vec<DeliveryOutcome> {
        let frame = Frame::notification(notification);
        let outcomes: Vec<DeliveryOutcome> = user_ids
            .iter()
            .map(|user_id| self.deliver(user_id, &frame))
            .collect();

        debug!(
            "Published notification {} to {} user(s)",
            notification.id,
            user_ids.len()
        );
        outcomes
    }

    /// Delivers to every user with a live connection - O(n)
    pub fn broadcast(&self, notification: &Notification) -> Vec<DeliveryOutcome> {
        let recipients = self.registry.recipients();
        self.publish_to_set(&recipients, notification)
    }

    /// Completes every live connection.
    pub fn shutdown(&self) {
        let recipients = self.registry.recipients();
        info!("Closing {} SSE connection(s)", recipients.len());

        for user_id in recipients {
            if let Some(handle) = self.registry.lookup(&user_id) {
                self.lifecycle
                    .complete(&handle, CompletionReason::ServerShutdown);
            }
        }
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    fn deliver(
        &self,
        user_id: &str,
        frame: &Result<Frame, serde_json::Error>,
    ) -> DeliveryOutcome {
        let Some(handle) = self.registry.lookup(user_id) else {
            debug!("No live SSE connection for user {user_id}, dropping event");
            return DeliveryOutcome::NoActiveConnection;
        };

        let sent = match frame {
            Ok(frame) => handle.send(frame.clone()).map_err(|e| e.to_string()),
            Err(e) => Err(format!("failed to serialize event: {e}")),
        };

        match sent {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(cause) => {
                warn!(
                    "Failed to send event to connection {}: {}. Connection will be cleaned up.",
                    handle.id(),
                    cause
                );
                self.lifecycle.fail(&handle, cause);
                DeliveryOutcome::DeliveryFailed
            }
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
