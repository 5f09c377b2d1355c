//! # Gatekeep - Identity and Session Library
//!
//! Facade crate re-exporting the public API of the gatekeep components:
//! user registration, credential checks and refresh-token sessions that mint
//! short-lived HS256 access tokens.
//!
//! ## Structure
//!
//! - **Core domain types**: `Username`, `Email`, `Password`, `User`, `Session`, etc.
//! - **Repository traits**: `UserStore`, `SessionStore`
//! - **Services**: `RegistrationService`, `AuthenticationService`, `SessionService`
//! - **Adapters**: in-memory and PostgreSQL stores, access-token validation,
//!   settings and tracing setup

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use gatekeep_core::*;
}

pub use gatekeep_core::{
    AccessClaims, Email, Field, Password, PasswordError, RefreshToken, Session, User, Username,
    ValidationError, ValidationErrors,
};

// ============================================================================
// Repository Traits (Ports)
// ============================================================================

/// Repository trait definitions
pub mod repositories {
    pub use gatekeep_core::{
        DuplicateField, SessionStore, SessionStoreError, UserStore, UserStoreError,
    };
}

pub use repositories::{DuplicateField, SessionStore, SessionStoreError, UserStore, UserStoreError};

// ============================================================================
// Services (Application Layer)
// ============================================================================

/// Application services
pub mod services {
    pub use gatekeep_application::*;
}

pub use gatekeep_application::{
    AccessTokenSigner, AuthenticateError, AuthenticationService, RegisterError,
    RegistrationService, SessionConfig, SessionError, SessionService, TokenSet,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use gatekeep_adapters::persistence::*;
    }

    /// Access token validation
    pub mod auth {
        pub use gatekeep_adapters::auth_validation::*;
    }

    /// Configuration
    pub mod config {
        pub use gatekeep_adapters::config::*;
    }

    pub use gatekeep_adapters::telemetry::init_tracing;
}

pub use gatekeep_adapters::{
    HashMapSessionStore, HashMapUserStore, LocalAccessTokenValidator, PostgresSessionStore,
    PostgresUserStore, Settings, configure_postgresql, init_tracing,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing repository traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

/// Re-export the cancellation token every service operation takes
pub use tokio_util::sync::CancellationToken;
