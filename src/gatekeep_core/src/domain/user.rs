use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{email::Email, password::Password, username::Username};

#[derive(Debug, Clone)]
pub struct User {
    id: Uuid,
    username: Username,
    email: Email,
    password: Password,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    email_confirmed_at: Option<DateTime<Utc>>,
    is_deleted: bool,
}

impl User {
    /// A freshly registered user: unconfirmed email, not deleted.
    pub fn new(username: Username, email: Email, password: Password) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password,
            created_at: now,
            updated_at: now,
            email_confirmed_at: None,
            is_deleted: false,
        }
    }

    /// Reconstitute a user from storage.
    #[allow(clippy::too_many_arguments)]
    pub fn load(
        id: Uuid,
        username: Username,
        email: Email,
        password: Password,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        email_confirmed_at: Option<DateTime<Utc>>,
        is_deleted: bool,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password,
            created_at,
            updated_at,
            email_confirmed_at,
            is_deleted,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn email_confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.email_confirmed_at
    }

    pub fn is_email_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password.compare(candidate)
    }
}
