//! LearnSphere Backend Library
//!
//! Stateless token authentication and role-based authorization for a
//! learning-management API. Exposes the modules used by the binary and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod lms;
pub mod middleware;

pub use api::{create_router, AppState};
pub use config::{AppConfig, ConfigError};
