//! Server-Sent Events (SSE) infrastructure for real-time notification delivery.
//!
//! This crate provides a best-effort push facility: each user holds at most one
//! live connection, and new notifications are written to that connection if it
//! exists.
//!
//! # Architecture
//!
//! - **Single connection per user**: A new subscription for a user replaces
//!   the previous one, which is completed as superseded.
//! - **Weak registry**: `SubscriptionRegistry` maps user id to a weak reference
//!   to the live `ConnectionHandle`. The subscription that created a handle
//!   owns it.
//! - **Explicit lifecycle**: Connections move from `Open` to exactly one of
//!   `Completed`, `TimedOut` or `Errored`. Every terminal transition removes
//!   the connection from the registry with a compare-and-remove, so a stale
//!   connection can never evict its successor.
//! - **Ephemeral messages**: If a user is offline the notification is dropped.
//!   There is no retry and no queue.
//!
//! # Message Flow
//!
//! 1. Client opens the SSE endpoint for a user
//! 2. `Manager::subscribe` registers a channel-backed connection and greets it
//! 3. The web handler drains `Subscription::next_frame` into the response stream
//! 4. When a notification is created, `Manager::publish` (or `publish_to_set`
//!    for role fan-out, `broadcast` for everyone) looks the user up and writes
//!    the event. A failed write errors the connection and deregisters it.
//! 5. When the client disconnects the subscription is dropped, which completes
//!    the connection and deregisters it.
//!
//! # Example: Publishing a notification
//!
//! ```rust,ignore
//! use sse::manager::DeliveryOutcome;
//!
//! match app_state.sse_manager.publish(&user_id, &notification) {
//!     DeliveryOutcome::Delivered => {}
//!     DeliveryOutcome::NoActiveConnection => {}
//!     DeliveryOutcome::DeliveryFailed => {}
//! }
//! ```
//!
//! # Modules
//!
//! - `connection`: ConnectionHandle, its state machine and the Sink abstraction
//! - `registry`: SubscriptionRegistry with compare-and-remove semantics
//! - `lifecycle`: Lifecycle transitions and the caller-owned Subscription
//! - `manager`: Publishing and connection management entry point
//! - `message`: Type-safe event definitions and serialized frames

pub mod connection;
pub mod lifecycle;
pub mod manager;
pub mod message;
pub mod registry;

pub use manager::{DeliveryOutcome, Manager};
