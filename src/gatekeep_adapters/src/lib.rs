pub mod auth_validation;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use auth_validation::{LocalAccessTokenValidator, TokenAuthError};
pub use config::{PostgresSettings, SessionSettings, Settings};
pub use persistence::{
    configure_postgresql, get_postgres_pool, hashmap_session_store::HashMapSessionStore,
    hashmap_user_store::HashMapUserStore, postgres_session_store::PostgresSessionStore,
    postgres_user_store::PostgresUserStore,
};
pub use telemetry::init_tracing;
