//! Bearer-token authentication against the user store.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use store::{User, UserStore};

use crate::error::ApiError;

/// Resolves the `Authorization: Bearer <token>` header to an account.
///
/// Unknown tokens and malformed headers are both rejected with the same
/// message so callers cannot probe which tokens exist.
pub async fn authenticate(users: &dyn UserStore, headers: &HeaderMap) -> Result<User, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("expected a bearer token".to_string()))?;

    users
        .find_user_by_token(token)
        .await
        .map_err(|_| ApiError::Unauthorized("invalid token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::UserId;
    use store::InMemoryUserStore;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let users = InMemoryUserStore::new();
        let user = User {
            id: UserId::new(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            api_token: "tok_123".to_string(),
            created_at: Utc::now(),
        };
        users.insert_user(user.clone()).await.unwrap();

        let resolved = authenticate(&users, &headers_with("Bearer tok_123"))
            .await
            .unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_missing_and_malformed_headers_rejected() {
        let users = InMemoryUserStore::new();

        let err = authenticate(&users, &HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err = authenticate(&users, &headers_with("Basic dXNlcg=="))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let users = InMemoryUserStore::new();
        let err = authenticate(&users, &headers_with("Bearer tok_nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
