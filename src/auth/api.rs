//! Authentication API Endpoints
//! Mission: Provide login and identity endpoints

use crate::api::extract::ApiJson;
use crate::api::response::{ok, ApiError, ApiResponse};
use crate::auth::{
    authenticator::{AuthError, Authenticator},
    jwt::JwtHandler,
    middleware::CurrentIdentity,
    models::{IdentityResponse, LoginRequest, LoginResponse, VerifiedIdentity},
    policy::AccessPolicy,
    user_store::CredentialStore,
};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub credentials: Arc<dyn CredentialStore>,
    pub jwt_handler: Arc<JwtHandler>,
    pub authenticator: Arc<Authenticator>,
    pub policy: Arc<AccessPolicy>,
}

impl AuthState {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        jwt_handler: Arc<JwtHandler>,
        authenticator: Arc<Authenticator>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            credentials,
            jwt_handler,
            authenticator,
            policy: Arc::new(policy),
        }
    }

    /// Verify a bearer token and confirm its subject still has an account.
    ///
    /// Every failure collapses to `None`; the reason is only logged.
    pub fn resolve_token(&self, token: &str) -> Option<VerifiedIdentity> {
        let identity = match self.jwt_handler.verify(token) {
            Ok(identity) => identity,
            Err(e) => {
                debug!("Bearer token rejected: {}", e);
                return None;
            }
        };

        match self.credentials.find_by_email(&identity.subject) {
            Ok(Some(_)) => Some(identity),
            Ok(None) => {
                debug!("Token subject {} has no account", identity.subject);
                None
            }
            Err(e) => {
                error!("Credential lookup failed during token resolution: {:#}", e);
                None
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::Internal(e) => ApiError::Internal(e),
        }
    }
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LoginResponse>>), ApiError> {
    info!("Login attempt: {}", payload.email);

    let response = state
        .authenticator
        .login(&payload.email, &payload.password)?;

    Ok(ok("Login successful", response))
}

/// Get current identity - GET /api/auth/me
/// Built from the verified token alone.
pub async fn get_current_user(
    CurrentIdentity(identity): CurrentIdentity,
) -> (StatusCode, Json<ApiResponse<IdentityResponse>>) {
    ok(
        "Current user retrieved successfully",
        IdentityResponse {
            email: identity.subject,
            role: identity.role,
        },
    )
}
