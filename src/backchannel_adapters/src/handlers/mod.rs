//! Framework-agnostic back-channel logout handlers.
//!
//! Framework routes wrap their request in a [`backchannel_core::LogoutRequest`],
//! call these handlers, and return the built response.

pub mod backchannel_logout;

pub use backchannel_logout::handle_backchannel_logout;
