//! Router assembly and shared application state

use crate::api::{courses, enrollments, users};
use crate::auth::{
    api as auth_api, authorize, resolve_identity, AccessPolicy, AuthState, Authenticator,
    JwtHandler, PasswordHasher, UserStore,
};
use crate::lms::CourseStore;
use crate::middleware::request_logging;
use anyhow::Result;
use axum::{
    extract::FromRef,
    http::{
        header::{AUTHORIZATION, CONTENT_SECURITY_POLICY, CONTENT_TYPE, X_FRAME_OPTIONS},
        HeaderValue, Method,
    },
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};
use tracing::warn;

const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'self'; frame-ancestors 'none'";
const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub users: Arc<UserStore>,
    pub courses: Arc<CourseStore>,
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Open both stores on `db_path` and wire the auth components together.
    pub fn new(db_path: &str, jwt_handler: JwtHandler, hasher: PasswordHasher) -> Result<Self> {
        let users = Arc::new(UserStore::new(db_path)?);
        let courses = Arc::new(CourseStore::new(db_path)?);
        let jwt_handler = Arc::new(jwt_handler);
        let authenticator = Arc::new(Authenticator::new(
            users.clone(),
            hasher,
            jwt_handler.clone(),
        ));
        let auth = AuthState::new(
            users.clone(),
            jwt_handler,
            authenticator,
            AccessPolicy::standard(),
        );

        Ok(Self {
            auth,
            users,
            courses,
            hasher,
        })
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Create the API router
///
/// Layers, outermost first: CORS, security headers, request logging,
/// identity resolver, authorization gate.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let auth = state.auth.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/auth/me", get(auth_api::get_current_user))
        .route("/api/users/register", post(users::register))
        .route("/api/users/all", get(users::list_users))
        .route("/api/courses/add", post(courses::add_course))
        .route("/api/courses/all", get(courses::list_courses))
        .route(
            "/api/courses/:id",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        .route("/api/enrollments/enroll", post(enrollments::enroll))
        .route(
            "/api/enrollments/user/:user_id",
            get(enrollments::user_courses),
        )
        .with_state(state)
        .layer(middleware::from_fn_with_state(auth.clone(), authorize))
        .layer(middleware::from_fn_with_state(auth, resolve_identity))
        .layer(middleware::from_fn(request_logging))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
        ))
        .layer(cors_layer(allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
