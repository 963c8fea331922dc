//! SSE HTTP handler for the web layer.
//!
//! The connection registry, lifecycle and event types live in the `sse`
//! crate; this module only adapts a subscription to an axum response stream.

pub mod handler;
