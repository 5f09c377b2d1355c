pub mod hashmap_session_store;
pub mod hashmap_user_store;
pub mod postgres_session_store;
pub mod postgres_user_store;

use gatekeep_core::DuplicateField;
use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::config::PostgresSettings;

/// Create a PostgreSQL connection pool and run all pending migrations
///
/// # Arguments
/// * `settings` - Connection URL and pool size
///
/// # Returns
/// A configured PgPool ready for use
pub async fn configure_postgresql(settings: &PostgresSettings) -> Result<PgPool, sqlx::Error> {
    let pg_pool = get_postgres_pool(settings.url.expose_secret(), settings.max_connections).await?;

    sqlx::migrate!("./migrations").run(&pg_pool).await?;

    Ok(pg_pool)
}

/// Create a PostgreSQL connection pool
pub async fn get_postgres_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
}

/// The field behind a unique violation, if `error` is one.
///
/// Relies on PostgreSQL's default constraint naming, `<table>_<column>_key`.
pub(crate) fn duplicate_field(error: &sqlx::Error) -> Option<DuplicateField> {
    let db_err = error.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    let constraint = db_err.constraint()?;
    Some(field_from_constraint(constraint))
}

fn field_from_constraint(constraint: &str) -> DuplicateField {
    let column = constraint
        .strip_suffix("_key")
        .and_then(|rest| {
            rest.strip_prefix("users_")
                .or_else(|| rest.strip_prefix("sessions_"))
        })
        .unwrap_or(constraint);
    DuplicateField::from_name(column)
}
