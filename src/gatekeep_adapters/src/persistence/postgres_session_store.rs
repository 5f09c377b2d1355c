use chrono::{DateTime, Utc};
use gatekeep_core::{RefreshToken, Session, SessionStore, SessionStoreError};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::duplicate_field;

pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresSessionStore { pool }
    }
}

#[derive(FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    token: String,
    created_at: DateTime<Utc>,
    refreshed_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session::load(
            row.id,
            row.user_id,
            RefreshToken::new(row.token),
            row.created_at,
            row.refreshed_at,
            row.expires_at,
        )
    }
}

fn map_write_error(e: sqlx::Error) -> SessionStoreError {
    if let Some(field) = duplicate_field(&e) {
        return SessionStoreError::Duplicate(field);
    }
    SessionStoreError::UnexpectedError(e.to_string())
}

#[async_trait::async_trait]
impl SessionStore for PostgresSessionStore {
    #[tracing::instrument(name = "Adding session to PostgreSQL", skip_all)]
    async fn append_session(&self, session: &Session) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
                INSERT INTO sessions (id, user_id, token, created_at, refreshed_at, expires_at)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id())
        .bind(session.user_id())
        .bind(session.token().as_str())
        .bind(session.created_at())
        .bind(session.refreshed_at())
        .bind(session.expires_at())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving session from PostgreSQL", skip_all)]
    async fn find_by_token(&self, token: &RefreshToken) -> Result<Session, SessionStoreError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
                SELECT id, user_id, token, created_at, refreshed_at, expires_at
                FROM sessions
                WHERE token = $1 AND expires_at > $2
            "#,
        )
        .bind(token.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionStoreError::UnexpectedError(e.to_string()))?;

        row.map(Session::from)
            .ok_or(SessionStoreError::SessionNotFound)
    }

    #[tracing::instrument(name = "Updating session in PostgreSQL", skip_all)]
    async fn update_session(
        &self,
        previous_token: &RefreshToken,
        session: &Session,
    ) -> Result<(), SessionStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE sessions
                SET token = $3, refreshed_at = $4, expires_at = $5
                WHERE id = $1 AND token = $2
            "#,
        )
        .bind(session.id())
        .bind(previous_token.as_str())
        .bind(session.token().as_str())
        .bind(session.refreshed_at())
        .bind(session.expires_at())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(SessionStoreError::SessionNotFound);
        }

        Ok(())
    }
}
