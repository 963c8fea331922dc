use serde::{Deserialize, Serialize};

/// How a notification's `target_id` is interpreted.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetType {
    /// `target_id` is a single user.
    #[default]
    User,
    /// `target_id` is a role; every member of the role is a recipient.
    Role,
    /// Every user is a recipient; `target_id` is ignored.
    All,
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetType::User => write!(fmt, "USER"),
            TargetType::Role => write!(fmt, "ROLE"),
            TargetType::All => write!(fmt, "ALL"),
        }
    }
}
