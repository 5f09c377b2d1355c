use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use gatekeep_core::{DuplicateField, RefreshToken, Session, SessionStore, SessionStoreError};

/// In-memory session store indexed by refresh token.
///
/// Several live sessions per user are allowed unless the store is built with
/// [`HashMapSessionStore::single_session_per_user`].
#[derive(Default, Clone)]
pub struct HashMapSessionStore {
    sessions: Arc<RwLock<HashMap<RefreshToken, Session>>>,
    single_session: bool,
}

impl HashMapSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject a new session while the user still holds an unexpired one.
    pub fn single_session_per_user() -> Self {
        Self {
            single_session: true,
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for HashMapSessionStore {
    async fn append_session(&self, session: &Session) -> Result<(), SessionStoreError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired_at(now));

        if sessions.contains_key(session.token()) {
            return Err(SessionStoreError::Duplicate(DuplicateField::Token));
        }

        if self.single_session {
            let logged_in = sessions.values().any(|s| s.user_id() == session.user_id());
            if logged_in {
                return Err(SessionStoreError::Duplicate(DuplicateField::Other(
                    "user_id".to_owned(),
                )));
            }
        }

        sessions.insert(session.token().clone(), session.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &RefreshToken) -> Result<Session, SessionStoreError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .filter(|s| !s.is_expired_at(Utc::now()))
            .cloned()
            .ok_or(SessionStoreError::SessionNotFound)
    }

    async fn update_session(
        &self,
        previous_token: &RefreshToken,
        session: &Session,
    ) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;

        let holds_previous = sessions
            .get(previous_token)
            .is_some_and(|stored| stored.id() == session.id());
        if !holds_previous {
            return Err(SessionStoreError::SessionNotFound);
        }

        if previous_token != session.token() && sessions.contains_key(session.token()) {
            return Err(SessionStoreError::Duplicate(DuplicateField::Token));
        }

        sessions.remove(previous_token);
        sessions.insert(session.token().clone(), session.clone());
        Ok(())
    }
}
