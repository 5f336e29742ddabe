//! Account creation.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use common::UserId;
use serde::{Deserialize, Serialize};
use store::{BookingStore, StoreError, User};

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize)]
pub struct UserCreatedResponse {
    pub id: String,
    pub email: String,
    /// Bearer token for subsequent requests. Shown only on creation.
    pub api_token: String,
}

/// POST /users — register a traveler account and issue its token.
#[tracing::instrument(skip(state, request))]
pub async fn create<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserCreatedResponse>), ApiError> {
    if !request.email.contains('@') {
        return Err(ApiError::BadRequest(
            "email is not a valid email address".to_string(),
        ));
    }
    if request.first_name.is_empty() || request.last_name.is_empty() {
        return Err(ApiError::BadRequest(
            "first_name and last_name are required".to_string(),
        ));
    }

    let user = User {
        id: UserId::new(),
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        api_token: format!("tok_{}", uuid::Uuid::new_v4().simple()),
        created_at: Utc::now(),
    };

    let response = UserCreatedResponse {
        id: user.id.to_string(),
        email: user.email.clone(),
        api_token: user.api_token.clone(),
    };

    state.users.insert_user(user).await.map_err(|e| match e {
        StoreError::Duplicate { .. } => ApiError::BadRequest("email already registered".to_string()),
        other => ApiError::Internal(other.to_string()),
    })?;

    Ok((StatusCode::CREATED, Json(response)))
}
