use crate::message::Frame;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;

// Type alias for user IDs (web layer converts entity::Id to String)
pub type UserId = String;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a connection reached `ConnectionState::Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// The client went away or the transport finished normally
    TransportClosed,
    /// A newer subscription for the same user replaced this one
    Superseded,
    /// Closed explicitly by the server
    ServerClosed,
    /// The server is shutting down
    ServerShutdown,
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionReason::TransportClosed => write!(f, "transport closed"),
            CompletionReason::Superseded => write!(f, "superseded"),
            CompletionReason::ServerClosed => write!(f, "server closed"),
            CompletionReason::ServerShutdown => write!(f, "server shutdown"),
        }
    }
}

/// Lifecycle state of a connection. `Open` is the only non-terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Completed(CompletionReason),
    TimedOut,
    Errored(String),
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConnectionState::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Completed(reason) => write!(f, "completed ({reason})"),
            ConnectionState::TimedOut => write!(f, "timed out"),
            ConnectionState::Errored(cause) => write!(f, "errored ({cause})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The receiving side of the transport is gone
    Closed,
    /// The connection already reached a terminal state
    NotOpen,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Closed => write!(f, "sink closed"),
            SinkError::NotOpen => write!(f, "connection is not open"),
        }
    }
}

impl std::error::Error for SinkError {}

/// Outbound, unidirectional event channel toward one user.
///
/// Implementations must not block beyond their own write timeout.
pub trait Sink: Send + Sync {
    fn send(&self, frame: Frame) -> Result<(), SinkError>;
}

impl Sink for UnboundedSender<Frame> {
    fn send(&self, frame: Frame) -> Result<(), SinkError> {
        UnboundedSender::send(self, frame).map_err(|_| SinkError::Closed)
    }
}

/// One live subscription: a user's sink plus its lifecycle state.
///
/// State transitions are only driven through [`crate::lifecycle::Lifecycle`],
/// which pairs every terminal transition with registry cleanup.
pub struct ConnectionHandle {
    id: ConnectionId,
    user_id: UserId,
    state: watch::Sender<ConnectionState>,
    sink: Box<dyn Sink>,
}

impl ConnectionHandle {
    pub(crate) fn new(user_id: UserId, sink: Box<dyn Sink>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Open);
        Self {
            id: ConnectionId::new(),
            user_id,
            state,
            sink,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        !self.state.borrow().is_terminal()
    }

    /// Writes one frame to the sink. Fails without touching the sink once the
    /// connection is terminal.
    pub fn send(&self, frame: Frame) -> Result<(), SinkError> {
        if !self.is_open() {
            return Err(SinkError::NotOpen);
        }
        self.sink.send(frame)
    }

    /// Moves an open connection to `next`. Returns false, leaving the state
    /// untouched, if the connection is already terminal.
    pub(crate) fn transition(&self, next: ConnectionState) -> bool {
        debug_assert!(next.is_terminal());
        self.state.send_if_modified(|current| {
            if current.is_terminal() {
                false
            } else {
                *current = next;
                true
            }
        })
    }

    /// Resolves with the terminal state once the connection leaves `Open`.
    pub async fn terminated(&self) -> ConnectionState {
        let mut receiver = self.state.subscribe();
        let state = match receiver.wait_for(ConnectionState::is_terminal).await {
            Ok(state) => (*state).clone(),
            Err(_) => self.state(),
        };
        state
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_transition_happens_exactly_once() {
        let (tx, _rx) = mpsc::unbounded_channel::<Frame>();
        let handle = ConnectionHandle::new("1".to_string(), Box::new(tx));

        assert!(handle.transition(ConnectionState::TimedOut));
        assert!(!handle.transition(ConnectionState::Errored("late".to_string())));
        assert!(!handle.transition(ConnectionState::Completed(
            CompletionReason::Superseded
        )));
        assert_eq!(handle.state(), ConnectionState::TimedOut);
    }

    #[test]
    fn test_send_is_rejected_once_terminal() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Frame>();
        let handle = ConnectionHandle::new("1".to_string(), Box::new(tx));
        let frame = Frame::connected().unwrap();

        assert!(handle.send(frame.clone()).is_ok());
        handle.transition(ConnectionState::Completed(CompletionReason::ServerClosed));

        assert_eq!(handle.send(frame.clone()), Err(SinkError::NotOpen));
        assert_eq!(rx.try_recv().unwrap(), frame);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_sink_reports_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<Frame>();
        let handle = ConnectionHandle::new("1".to_string(), Box::new(tx));
        drop(rx);

        assert_eq!(
            handle.send(Frame::connected().unwrap()),
            Err(SinkError::Closed)
        );
        assert!(handle.is_open());
    }

    #[tokio::test]
    async fn test_terminated_resolves_after_transition() {
        let (tx, _rx) = mpsc::unbounded_channel::<Frame>();
        let handle = std::sync::Arc::new(ConnectionHandle::new("1".to_string(), Box::new(tx)));

        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.terminated().await })
        };
        handle.transition(ConnectionState::Errored("broken pipe".to_string()));

        assert_eq!(
            waiter.await.unwrap(),
            ConnectionState::Errored("broken pipe".to_string())
        );
    }
}
