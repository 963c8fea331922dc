use serde::{Deserialize, Serialize};

/// Severity a client should use when rendering a notification.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationLevel {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Info => write!(fmt, "INFO"),
            NotificationLevel::Warning => write!(fmt, "WARNING"),
            NotificationLevel::Success => write!(fmt, "SUCCESS"),
            NotificationLevel::Error => write!(fmt, "ERROR"),
        }
    }
}
