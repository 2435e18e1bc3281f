//! Axum integration for OIDC back-channel logout.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  backchannel_core: HTTP trait definitions    │
//! └──────────────┬───────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────────────────────┐
//! │  backchannel_axum: Axum implementations      │
//! │  - AxumLogoutRequest / AxumResponseBuilder   │
//! │  - backchannel_logout_filter middleware      │
//! │  - backchannel_logout route                  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let state = BackChannelLogoutState::new(Arc::new(use_case));
//! let app = with_backchannel_logout(Router::new().route("/", get(home)), state);
//! ```

pub mod adapters;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod test_support;

pub use adapters::{AxumLogoutRequest, AxumResponseBuilder, DEFAULT_BODY_LIMIT, response_builder};
pub use middleware::{BackChannelLogoutState, backchannel_logout_filter, with_backchannel_logout};
