use serde::{Deserialize, Serialize};

/// Dispatch status of a notification.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationStatus {
    /// Created but not yet dispatched
    #[default]
    Pending,
    /// Dispatched. Says nothing about whether the recipient was online.
    Sent,
    /// Every attempted write to a live connection failed
    Failed,
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationStatus::Pending => write!(fmt, "PENDING"),
            NotificationStatus::Sent => write!(fmt, "SENT"),
            NotificationStatus::Failed => write!(fmt, "FAILED"),
        }
    }
}
