use entity::notifications::Model as Notification;
use serde::Serialize;

/// Id carried by the greeting frame sent when a connection opens.
pub const CONNECTED_EVENT_ID: &str = "connect";

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Event<'a> {
    // Connection lifecycle
    #[serde(rename = "connected")]
    Connected { message: &'a str },

    // Notifications
    #[serde(rename = "notification")]
    Notification { notification: &'a Notification },
}

impl EventType for Event<'_> {
    fn event_type(&self) -> &'static str {
        match self {
            Event::Connected { .. } => "connected",
            Event::Notification { .. } => "notification",
        }
    }
}

/// One serialized event, ready to be written to a connection's sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// De-duplication hint for the receiving side
    pub id: String,
    pub event_type: &'static str,
    pub data: String,
}

impl Frame {
    pub fn new(id: impl Into<String>, event: &Event<'_>) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: id.into(),
            event_type: event.event_type(),
            data: serde_json::to_string(event)?,
        })
    }

    /// Greeting written to every newly established connection.
    pub fn connected() -> Result<Self, serde_json::Error> {
        Self::new(
            CONNECTED_EVENT_ID,
            &Event::Connected {
                message: "Connected, waiting for real-time notifications",
            },
        )
    }

    /// Tagged with the notification's id.
    pub fn notification(notification: &Notification) -> Result<Self, serde_json::Error> {
        Self::new(
            notification.id.to_string(),
            &Event::Notification { notification },
        )
    }
}

impl From<Frame> for axum::response::sse::Event {
    fn from(frame: Frame) -> Self {
        axum::response::sse::Event::default()
            .id(frame.id)
            .event(frame.event_type)
            .data(frame.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use entity::{
        notification_level::NotificationLevel, notification_status::NotificationStatus,
        notification_type::NotificationType, target_type::TargetType,
    };
    use serde_json::{json, Value};

    #[test]
    fn test_notification_frame_is_tagged_with_notification_id() {
        let now = Utc::now();
        let notification = Notification {
            id: 1_234_567,
            title: "New feature".to_string(),
            content: "Dark mode is live".to_string(),
            notification_type: NotificationType::Feature,
            level: NotificationLevel::Success,
            target_type: TargetType::User,
            target_id: Some(1),
            status: NotificationStatus::Pending,
            read: false,
            create_time: now,
            update_time: now,
        };

        let frame = Frame::notification(&notification).unwrap();

        assert_eq!(frame.id, "1234567");
        assert_eq!(frame.event_type, "notification");

        let data: Value = serde_json::from_str(&frame.data).unwrap();
        assert_eq!(data["type"], json!("notification"));
        assert_eq!(data["data"]["notification"]["id"], json!(1_234_567));
        assert_eq!(data["data"]["notification"]["type"], json!("FEATURE"));
    }

    #[test]
    fn test_connected_frame_uses_fixed_id() {
        let frame = Frame::connected().unwrap();

        assert_eq!(frame.id, CONNECTED_EVENT_ID);
        assert_eq!(frame.event_type, "connected");
        assert!(!frame.data.contains('\n'));
    }
}
