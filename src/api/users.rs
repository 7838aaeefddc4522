//! User registration and listing endpoints

use crate::api::extract::ApiJson;
use crate::api::response::{created, ok, ApiError, ApiResponse};
use crate::api::routes::AppState;
use crate::auth::models::{RegisterRequest, Role, UserResponse};
use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

const MIN_PASSWORD_LEN: usize = 8;
const DUPLICATE_EMAIL: &str = "Email is already registered";

/// Register endpoint - POST /api/users/register
/// Self-registration only ever creates STUDENT accounts.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let name = payload.name.trim();
    let email = payload.email.trim();

    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if state.users.exists_by_email(email)? {
        return Err(ApiError::Conflict(DUPLICATE_EMAIL.to_string()));
    }

    let password_hash = state.hasher.hash(&payload.password)?;
    let user = state
        .users
        .create_user(name, email, &password_hash, Role::Student)
        .map_err(|e| ApiError::conflict_on_unique(e, DUPLICATE_EMAIL))?;

    info!("Registered user {} ({})", user.id, user.email);
    Ok(created(
        "User registered successfully",
        UserResponse::from_user(&user),
    ))
}

/// GET /api/users/all
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<UserResponse>>>), ApiError> {
    let users = state
        .users
        .list_users()?
        .iter()
        .map(UserResponse::from_user)
        .collect::<Vec<_>>();

    Ok(ok("Users retrieved successfully", users))
}
