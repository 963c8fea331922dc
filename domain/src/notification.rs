//! Creating notifications and handing them to the real-time push layer.
//!
//! Delivery is best-effort: a recipient without a live connection simply
//! misses the notification, and the notification is still reported as `SENT`.

use crate::error::Error;
use crate::notification_level::NotificationLevel;
use crate::notification_status::NotificationStatus;
use crate::notification_type::NotificationType;
use crate::notifications::Model;
use crate::target_type::TargetType;
use crate::Id;
use chrono::Utc;
use log::*;
use serde::Deserialize;
use service::directory::RecipientResolver;
use service::snowflake::IdGenerator;
use sse::connection::UserId;
use sse::{DeliveryOutcome, Manager};

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_CONTENT_LENGTH: usize = 1000;

/// Client-supplied fields of a notification to create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub level: NotificationLevel,
    pub target_type: TargetType,
    #[serde(default)]
    pub target_id: Option<Id>,
}

/// Who a notification is pushed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Users(Vec<UserId>),
    /// Every user with a live connection
    Everyone,
}

/// Creates a notification, pushes it to its audience and returns it with its
/// dispatch status.
pub async fn send(
    manager: &Manager,
    resolver: &dyn RecipientResolver,
    id_generator: &IdGenerator,
    new_notification: NewNotification,
) -> Result<Model, Error> {
    let mut notification = create(id_generator, new_notification)?;
    let audience = resolve_audience(resolver, &notification).await?;

    dispatch(manager, &audience, &mut notification);

    Ok(notification)
}

/// Sends several notifications. Every one is validated and its audience
/// resolved before any is pushed, so an invalid entry means nothing is sent.
/// Once pushing starts each notification is delivered independently.
pub async fn send_batch(
    manager: &Manager,
    resolver: &dyn RecipientResolver,
    id_generator: &IdGenerator,
    new_notifications: Vec<NewNotification>,
) -> Result<Vec<Model>, Error> {
    for new_notification in &new_notifications {
        validate(new_notification)?;
    }

    let mut prepared = Vec::with_capacity(new_notifications.len());
    for new_notification in new_notifications {
        let notification = create(id_generator, new_notification)?;
        let audience = resolve_audience(resolver, &notification).await?;
        prepared.push((notification, audience));
    }

    Ok(prepared
        .into_iter()
        .map(|(mut notification, audience)| {
            dispatch(manager, &audience, &mut notification);
            notification
        })
        .collect())
}

/// Validates `new_notification` and assigns it a fresh id. The result is
/// `PENDING` and unread.
pub fn create(id_generator: &IdGenerator, new_notification: NewNotification) -> Result<Model, Error> {
    validate(&new_notification)?;

    let now = Utc::now();
    Ok(Model {
        id: id_generator.next_id(),
        title: new_notification.title,
        content: new_notification.content,
        notification_type: new_notification.notification_type,
        level: new_notification.level,
        target_type: new_notification.target_type,
        target_id: new_notification.target_id,
        status: NotificationStatus::Pending,
        read: false,
        create_time: now,
        update_time: now,
    })
}

pub fn validate(new_notification: &NewNotification) -> Result<(), Error> {
    check_text("title", &new_notification.title, MAX_TITLE_LENGTH)?;
    check_text("content", &new_notification.content, MAX_CONTENT_LENGTH)?;

    match (new_notification.target_type, new_notification.target_id) {
        (TargetType::User, None) => Err(Error::invalid("targetId is required for USER targets")),
        (TargetType::Role, None) => Err(Error::invalid("targetId is required for ROLE targets")),
        _ => Ok(()),
    }
}

fn check_text(field: &str, value: &str, max_length: usize) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::invalid(format!("{field} must not be blank")));
    }
    if value.chars().count() > max_length {
        return Err(Error::invalid(format!(
            "{field} must be at most {max_length} characters"
        )));
    }
    Ok(())
}

/// Expands a notification's target into the users it should reach.
pub async fn resolve_audience(
    resolver: &dyn RecipientResolver,
    notification: &Model,
) -> Result<Audience, Error> {
    let audience = match (notification.target_type, notification.target_id) {
        (TargetType::User, Some(user_id)) => Audience::Users(vec![user_id.to_string()]),
        (TargetType::Role, Some(role_id)) => Audience::Users(
            resolver
                .members_of_role(role_id)
                .await?
                .into_iter()
                .map(|user_id| user_id.to_string())
                .collect(),
        ),
        (TargetType::All, _) => Audience::Everyone,
        (target_type, None) => {
            return Err(Error::invalid(format!(
                "targetId is required for {target_type} targets"
            )))
        }
    };

    Ok(audience)
}

/// Pushes the notification and records the resulting status on it.
pub fn dispatch(
    manager: &Manager,
    audience: &Audience,
    notification: &mut Model,
) -> Vec<DeliveryOutcome> {
    let outcomes = match audience {
        Audience::Users(user_ids) => manager.publish_to_set(user_ids, notification),
        Audience::Everyone => manager.broadcast(notification),
    };

    notification.set_status(status_for(&outcomes));
    debug!(
        "Notification {} dispatched as {}: {:?}",
        notification.id, notification.status, outcomes
    );

    outcomes
}

/// `FAILED` only when at least one write failed and none succeeded. Offline
/// recipients count as dispatched.
pub fn status_for(outcomes: &[DeliveryOutcome]) -> NotificationStatus {
    let delivered = outcomes.contains(&DeliveryOutcome::Delivered);
    let failed = outcomes.contains(&DeliveryOutcome::DeliveryFailed);

    if failed && !delivered {
        NotificationStatus::Failed
    } else {
        NotificationStatus::Sent
    }
}
