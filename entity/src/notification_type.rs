use serde::{Deserialize, Serialize};

/// Category of a notification.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationType {
    #[default]
    System,
    Security,
    Feature,
    Backup,
    Alert,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::System => write!(fmt, "SYSTEM"),
            NotificationType::Security => write!(fmt, "SECURITY"),
            NotificationType::Feature => write!(fmt, "FEATURE"),
            NotificationType::Backup => write!(fmt, "BACKUP"),
            NotificationType::Alert => write!(fmt, "ALERT"),
        }
    }
}
