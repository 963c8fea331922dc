// Notification entities
pub mod notification_level;
pub mod notification_status;
pub mod notification_type;
pub mod notifications;
pub mod target_type;

/// A type alias that represents any Entity's internal id field data type.
/// Snowflake-style 64-bit ids; aliased so the underlying type is easy to change.
pub type Id = i64;
