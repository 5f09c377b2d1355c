use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use gatekeep_core::{DuplicateField, Email, User, UserStore, UserStoreError, Username};

#[derive(Default, Clone)]
pub struct HashMapUserStore {
    users: Arc<RwLock<HashMap<Username, User>>>,
}

impl HashMapUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl UserStore for HashMapUserStore {
    async fn append_user(&self, user: User) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(user.username()) {
            return Err(UserStoreError::Duplicate(DuplicateField::Username));
        }
        if users.values().any(|u| u.email() == user.email()) {
            return Err(UserStoreError::Duplicate(DuplicateField::Email));
        }
        users.insert(user.username().clone(), user);
        Ok(())
    }

    async fn find_by_username(&self, username: &Username) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .get(username)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .values()
            .find(|u| u.email() == email)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;
    use fake::faker::internet::en::{SafeEmail, Username as FakeUsername};
    use gatekeep_core::Password;
    use secrecy::Secret;

    fn user(username: &str, email: &str) -> User {
        User::new(
            Username::parse(username).unwrap(),
            Email::parse(email).unwrap(),
            Password::from_hash(Secret::new("$argon2id$stub".to_owned())),
        )
    }

    #[tokio::test]
    async fn test_append_and_find_user() {
        let store = HashMapUserStore::new();
        let username: String = FakeUsername().fake();
        let username = format!("{username}_x");
        let email: String = SafeEmail().fake();
        let user = user(&username, &email);
        let user_id = user.id();

        store.append_user(user).await.unwrap();

        let by_username = store
            .find_by_username(&Username::parse(username).unwrap())
            .await
            .unwrap();
        let by_email = store
            .find_by_email(&Email::parse(&email).unwrap())
            .await
            .unwrap();
        assert_eq!(by_username.id(), user_id);
        assert_eq!(by_email.id(), user_id);
    }

    #[tokio::test]
    async fn test_duplicate_fields_are_reported() {
        let store = HashMapUserStore::new();
        store
            .append_user(user("alice", "alice@example.com"))
            .await
            .unwrap();

        let same_username = store.append_user(user("alice", "other@example.com")).await;
        let same_email = store.append_user(user("bob", "alice@example.com")).await;

        assert_eq!(
            same_username,
            Err(UserStoreError::Duplicate(DuplicateField::Username))
        );
        assert_eq!(
            same_email,
            Err(UserStoreError::Duplicate(DuplicateField::Email))
        );
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = HashMapUserStore::new();

        let result = store
            .find_by_username(&Username::parse("nobody").unwrap())
            .await;

        assert_eq!(result.err(), Some(UserStoreError::UserNotFound));
    }
}
