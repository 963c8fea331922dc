//! Notification record pushed to connected users.

use crate::notification_level::NotificationLevel;
use crate::notification_status::NotificationStatus;
use crate::notification_type::NotificationType;
use crate::target_type::TargetType;
use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Id,

    pub title: String,

    pub content: String,

    #[serde(rename = "type")]
    pub notification_type: NotificationType,

    pub level: NotificationLevel,

    pub target_type: TargetType,

    /// Recipient user when `target_type` is `USER`, role when `ROLE`
    pub target_id: Option<Id>,

    pub status: NotificationStatus,

    /// Set by the read-tracking collaborator, never by delivery
    pub read: bool,

    pub create_time: DateTime<Utc>,

    pub update_time: DateTime<Utc>,
}

impl Model {
    /// Records the outcome of a dispatch attempt.
    pub fn set_status(&mut self, status: NotificationStatus) {
        self.status = status;
        self.touch();
    }

    pub fn mark_read(&mut self) {
        self.read = true;
        self.touch();
    }

    fn touch(&mut self) {
        self.update_time = Utc::now();
    }
}
