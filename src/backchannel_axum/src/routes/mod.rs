//! Axum-specific route handlers.
//!
//! Routes extract the request, call the framework-agnostic handler, and turn
//! the result into an axum response.

pub mod backchannel_logout;

pub use backchannel_logout::backchannel_logout;
