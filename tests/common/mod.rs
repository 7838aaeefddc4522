//! Shared fixtures for router-level integration tests

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use learnsphere_backend::{
    auth::{jwt::DEFAULT_TTL, JwtHandler, PasswordHasher, Role},
    create_router, AppState,
};
use serde_json::Value;
use std::time::Duration;
use tempfile::NamedTempFile;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-signing-key-0123456789";
pub const ADMIN_EMAIL: &str = "admin@learnsphere.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const STUDENT_EMAIL: &str = "student@learnsphere.test";
pub const STUDENT_PASSWORD: &str = "student-password";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub student_id: i64,
    _db: NamedTempFile,
}

impl TestApp {
    /// App with one bootstrap admin and one registered student.
    pub fn new() -> Self {
        let db = NamedTempFile::new().unwrap();
        let jwt = JwtHandler::new(SECRET, DEFAULT_TTL).unwrap();
        let state = AppState::new(
            db.path().to_str().unwrap(),
            jwt,
            PasswordHasher::new(learnsphere_backend::config::MIN_BCRYPT_COST),
        )
        .unwrap();

        state
            .users
            .ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD, &state.hasher)
            .unwrap();
        let hash = state.hasher.hash(STUDENT_PASSWORD).unwrap();
        let student = state
            .users
            .create_user("Student", STUDENT_EMAIL, &hash, Role::Student)
            .unwrap();

        let origins = vec!["http://localhost:3000".to_string()];
        let router = create_router(state.clone(), &origins);

        Self {
            router,
            state,
            student_id: student.id,
            _db: db,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.dispatch(request).await
    }

    /// Send a JSON-typed request whose body is taken verbatim.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        self.dispatch(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Log in and return the issued token, panicking on failure.
    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let (status, body) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn student_token(&self) -> String {
        self.token_for(STUDENT_EMAIL, STUDENT_PASSWORD).await
    }

    /// A validly signed token that is already expired.
    pub fn expired_token(&self, email: &str, role: Role) -> String {
        JwtHandler::new(SECRET, Duration::ZERO)
            .unwrap()
            .issue(email, role)
            .unwrap()
    }
}
