use crate::connection::{CompletionReason, ConnectionHandle, ConnectionState, Sink, UserId};
use crate::message::Frame;
use crate::registry::SubscriptionRegistry;
use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

/// Drives connections through `Open -> {Completed, TimedOut, Errored}`.
///
/// Every terminal transition, whatever caused it, goes through
/// [`Lifecycle::terminate`], which compare-and-removes the connection from the
/// registry. A connection can only ever evict its own entry.
pub struct Lifecycle {
    registry: Arc<SubscriptionRegistry>,
}

impl Lifecycle {
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    /// Creates and registers a connection for `user_id`, completing any
    /// connection it replaces with `CompletionReason::Superseded`.
    pub fn establish(&self, user_id: UserId, sink: Box<dyn Sink>) -> Arc<ConnectionHandle> {
        let handle = Arc::new(ConnectionHandle::new(user_id, sink));

        if let Some(previous) = self.registry.register(&handle) {
            info!(
                "SSE connection {} for user {} superseded by {}",
                previous.id(),
                previous.user_id(),
                handle.id()
            );
            self.complete(&previous, CompletionReason::Superseded);
        }

        handle
    }

    pub fn complete(&self, handle: &ConnectionHandle, reason: CompletionReason) -> bool {
        self.terminate(handle, ConnectionState::Completed(reason))
    }

    pub fn time_out(&self, handle: &ConnectionHandle) -> bool {
        self.terminate(handle, ConnectionState::TimedOut)
    }

    pub fn fail(&self, handle: &ConnectionHandle, cause: impl Into<String>) -> bool {
        self.terminate(handle, ConnectionState::Errored(cause.into()))
    }

    /// Returns false if the connection was already terminal, in which case
    /// nothing is cleaned up twice.
    fn terminate(&self, handle: &ConnectionHandle, next: ConnectionState) -> bool {
        if !handle.transition(next) {
            return false;
        }

        let removed = self.registry.remove(handle.user_id(), handle);
        debug!(
            "SSE connection {} for user {} {} (registry entry removed: {})",
            handle.id(),
            handle.user_id(),
            handle.state(),
            removed
        );
        true
    }
}

/// The caller's side of one subscription.
///
/// Owns the connection handle and the receiving end of its channel. The
/// transport drains frames with [`Subscription::next_frame`] and reports
/// transport events back through `time_out`, `fail` and `close`. Dropping
/// the subscription counts as the client going away.
pub struct Subscription {
    handle: Arc<ConnectionHandle>,
    lifecycle: Arc<Lifecycle>,
    receiver: UnboundedReceiver<Frame>,
    deadline: Option<Instant>,
}

impl Subscription {
    pub(crate) fn new(
        handle: Arc<ConnectionHandle>,
        lifecycle: Arc<Lifecycle>,
        receiver: UnboundedReceiver<Frame>,
    ) -> Self {
        Self {
            handle,
            lifecycle,
            receiver,
            deadline: None,
        }
    }

    /// Times the connection out once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn handle(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }

    /// Next frame to write to the transport, or `None` once the connection is
    /// terminal. Reaching the deadline moves the connection to `TimedOut`.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.handle.terminated() => None,
            _ = expired => {
                self.lifecycle.time_out(&self.handle);
                None
            }
            frame = self.receiver.recv() => frame,
        }
    }

    pub fn time_out(&self) -> bool {
        self.lifecycle.time_out(&self.handle)
    }

    pub fn fail(&self, cause: impl Into<String>) -> bool {
        self.lifecycle.fail(&self.handle, cause)
    }

    /// Server-initiated close.
    pub fn close(&self) -> bool {
        self.lifecycle
            .complete(&self.handle, CompletionReason::ServerClosed)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.lifecycle
            .complete(&self.handle, CompletionReason::TransportClosed);
    }
}
