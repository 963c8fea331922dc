//! Business operations for creating and dispatching notifications.
//!
//! Consumers of the `domain` crate get the entity types re-exported here so they
//! do not need to depend on `entity` directly.

pub use entity::{
    notification_level, notification_status, notification_type, notifications, target_type, Id,
};

pub mod error;
pub mod notification;
