//! Traveler accounts and the user store contract.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::UserId;
use tokio::sync::RwLock;

use crate::{Result, StoreError};

/// A traveler account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Bearer token accepted by the HTTP layer for this account.
    pub api_token: String,
    pub created_at: DateTime<Utc>,
}

/// Storage contract for traveler accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user. The email must be unused.
    async fn insert_user(&self, user: User) -> Result<()>;

    /// Loads a user by id.
    async fn get_user(&self, id: UserId) -> Result<User>;

    /// Looks up an account by email.
    async fn find_user_by_email(&self, email: &str) -> Result<User>;

    /// Resolves a bearer token to the account it belongs to.
    async fn find_user_by_token(&self, token: &str) -> Result<User>;
}

/// In-memory user store.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of accounts stored.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert_user(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate {
                entity: "user",
                key: user.email.clone(),
            });
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        let users = self.users.read().await;
        users.get(&id).cloned().ok_or_else(|| StoreError::NotFound {
            entity: "user",
            key: id.to_string(),
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        let users = self.users.read().await;
        users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "user",
                key: email.to_string(),
            })
    }

    async fn find_user_by_token(&self, token: &str) -> Result<User> {
        let users = self.users.read().await;
        users
            .values()
            .find(|u| u.api_token == token)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "user",
                key: "token".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: &str) -> User {
        User {
            id: UserId::new(),
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            api_token: format!("tok_{email}"),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = InMemoryUserStore::new();
        let user = sample_user("ada@example.com");
        let id = user.id;

        store.insert_user(user).await.unwrap();
        let loaded = store.get_user(id).await.unwrap();
        assert_eq!(loaded.email, "ada@example.com");

        let by_token = store
            .find_user_by_token("tok_ada@example.com")
            .await
            .unwrap();
        assert_eq!(by_token.id, id);

        let by_email = store.find_user_by_email("ada@example.com").await.unwrap();
        assert_eq!(by_email.id, id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryUserStore::new();
        store
            .insert_user(sample_user("ada@example.com"))
            .await
            .unwrap();
        let err = store
            .insert_user(sample_user("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let store = InMemoryUserStore::new();
        let err = store.find_user_by_token("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
