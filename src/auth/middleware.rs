//! Authentication Middleware
//! Mission: Re-establish identity from bearer tokens, then gate routes by role

use crate::api::response::ApiError;
use crate::auth::{
    api::AuthState,
    models::VerifiedIdentity,
    policy::Decision,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
}

/// Identity resolver. Never rejects: a missing or bad token just leaves the
/// request unauthenticated for [`authorize`] to judge.
pub async fn resolve_identity(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.extensions().get::<VerifiedIdentity>().is_none() {
        let identity = bearer_token(req.headers()).and_then(|token| auth.resolve_token(token));
        if let Some(identity) = identity {
            req.extensions_mut().insert(identity);
        }
    }

    next.run(req).await
}

/// Authorization gate evaluated after identity resolution.
pub async fn authorize(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    let decision = auth.policy.decide(
        req.method(),
        req.uri().path(),
        req.extensions().get::<VerifiedIdentity>(),
    );

    match decision {
        Decision::Allow => next.run(req).await,
        Decision::Unauthenticated => {
            debug!("Unauthenticated request to {} {}", req.method(), req.uri().path());
            ApiError::Unauthorized.into_response()
        }
        Decision::InsufficientRole => {
            debug!("Insufficient role for {} {}", req.method(), req.uri().path());
            ApiError::Forbidden.into_response()
        }
    }
}

/// Handler extractor for the caller's verified identity.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub VerifiedIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedIdentity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or(ApiError::Unauthorized)
    }
}
