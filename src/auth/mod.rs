//! Authentication Module
//! Mission: Stateless JWT authentication and role-based request authorization

pub mod api;
pub mod authenticator;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod user_store;

pub use api::AuthState;
pub use authenticator::{AuthError, Authenticator};
pub use jwt::{JwtHandler, TokenError};
pub use middleware::{authorize, resolve_identity, CurrentIdentity};
pub use models::{Role, VerifiedIdentity};
pub use password::PasswordHasher;
pub use policy::AccessPolicy;
pub use user_store::{CredentialStore, UserStore};
