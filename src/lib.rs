//! # Backchannel - OIDC Back-Channel Logout for relying parties
//!
//! Facade crate re-exporting the public APIs of the back-channel logout
//! components. Depend on this crate to get everything in one place.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! backchannel = { path = "../backchannel" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `LogoutTokenClaims`, `LogoutAuthentication`, `SessionRecord`, ...
//! - **Ports**: `LogoutTokenDecoder`, `ClientRegistrationRepository`, `SessionRegistry`, `JtiStore`
//! - **Use cases**: `LogoutTokenConverter`, `LogoutTokenAuthenticator`, `BackChannelLogoutUseCase`, ...
//! - **Adapters**: `JwtLogoutTokenDecoder`, `JwksKeyProvider`, `RedisSessionRegistry`, ...
//! - **Axum glue**: `with_backchannel_logout`, `routes::backchannel_logout`
//! - **Service**: `LogoutService`, the standalone endpoint

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use backchannel_core::*;
}

pub use backchannel_core::{
    BackChannelLogoutError, ClientRegistration, InvalidRequestReason, InvalidTokenReason,
    InvalidationOutcome, InvalidationReport, LogoutAuthentication, LogoutIdentifier,
    LogoutTokenClaims, LogoutTokenRequest, OAuth2Error, ServiceError, SessionCriteria, SessionId,
    SessionRecord,
};

// ============================================================================
// Ports
// ============================================================================

/// Repository and service traits
pub mod repositories {
    pub use backchannel_core::{
        ClientRegistrationRepository, ClientRegistryError, JtiStore, JtiStoreError,
        LogoutTokenDecoder, SessionRegistry, SessionRegistryError, TokenDecodeError,
    };
}

pub use backchannel_core::{
    ClientRegistrationRepository, JtiStore, LogoutAuthenticationManager, LogoutHandler,
    LogoutTokenDecoder, SessionRegistry,
};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use backchannel_application::*;
}

pub use backchannel_application::{
    BackChannelLogoutOutcome, BackChannelLogoutUseCase, LogoutTokenAuthenticator,
    LogoutTokenConverter, SessionCorrelationResolver, SessionInvalidationHandler,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Framework-agnostic handlers
    pub mod handlers {
        pub use backchannel_adapters::handlers::*;
    }

    /// Session registries and jti stores
    pub mod persistence {
        pub use backchannel_adapters::persistence::*;
    }

    /// Logout token verification
    pub mod token {
        pub use backchannel_adapters::token::*;
    }

    /// Configuration
    pub mod config {
        pub use backchannel_adapters::config::*;
    }
}

pub use backchannel_adapters::{
    BackChannelSettings, CompositeKeyProvider, DashMapJtiStore, HashMapSessionRegistry,
    InMemoryClientRegistry, JwksKeyProvider, JwtLogoutTokenDecoder, PostgresSessionRegistry,
    RedisJtiStore, RedisSessionRegistry, StaticKeyProvider, VerificationKey,
};

// ============================================================================
// Axum Integration
// ============================================================================

/// Axum adapters, middleware and routes
pub mod axum_integration {
    pub use backchannel_axum::*;
}

pub use backchannel_axum::{BackChannelLogoutState, routes, with_backchannel_logout};

// ============================================================================
// Logout Service (Main Entry Point)
// ============================================================================

pub use backchannel_service::{
    LogoutComponents, LogoutService, ServiceSetupError, build_components, configure_postgresql,
    configure_redis, get_redis_client,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing the ports
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
