use chrono::{DateTime, Utc};
use gatekeep_core::{Email, Password, User, UserStore, UserStoreError, Username};
use secrecy::{ExposeSecret, Secret};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::duplicate_field;

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresUserStore { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<User, UserStoreError> {
        let query = format!(
            r#"
                SELECT id, username, email, password_hash, created_at, updated_at,
                       email_confirmed_at, is_deleted
                FROM users
                WHERE {column} = $1
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(UserStoreError::UserNotFound);
        };

        row.try_into()
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    email_confirmed_at: Option<DateTime<Utc>>,
    is_deleted: bool,
}

impl TryFrom<UserRow> for User {
    type Error = UserStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(row.username)
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;
        let email =
            Email::parse(&row.email).map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        Ok(User::load(
            row.id,
            username,
            email,
            Password::from_hash(Secret::new(row.password_hash)),
            row.created_at,
            row.updated_at,
            row.email_confirmed_at,
            row.is_deleted,
        ))
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[tracing::instrument(name = "Adding user to PostgreSQL", skip_all)]
    async fn append_user(&self, user: User) -> Result<(), UserStoreError> {
        sqlx::query(
            r#"
                INSERT INTO users (id, username, email, password_hash, created_at, updated_at,
                                   email_confirmed_at, is_deleted)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id())
        .bind(user.username().as_str())
        .bind(user.email().as_str())
        .bind(user.password().hash().expose_secret().as_str())
        .bind(user.created_at())
        .bind(user.updated_at())
        .bind(user.email_confirmed_at())
        .bind(user.is_deleted())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(field) = duplicate_field(&e) {
                return UserStoreError::Duplicate(field);
            }
            UserStoreError::UnexpectedError(e.to_string())
        })?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving user by username from PostgreSQL", skip_all)]
    async fn find_by_username(&self, username: &Username) -> Result<User, UserStoreError> {
        self.find_one("username", username.as_str()).await
    }

    #[tracing::instrument(name = "Retrieving user by email from PostgreSQL", skip_all)]
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        self.find_one("email", email.as_str()).await
    }
}
