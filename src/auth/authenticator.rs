//! Authenticator
//! Mission: Exchange email + password for a signed session token

use crate::auth::jwt::JwtHandler;
use crate::auth::models::LoginResponse;
use crate::auth::password::PasswordHasher;
use crate::auth::user_store::CredentialStore;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Login failures. Unknown email and wrong password are the same variant.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication failed: {0}")]
    Internal(#[from] anyhow::Error),
}

pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    jwt: Arc<JwtHandler>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, jwt: Arc<JwtHandler>) -> Self {
        Self { store, hasher, jwt }
    }

    /// Verify credentials and issue a token. Writes nothing.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let user = match self.store.find_by_email(email) {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("Failed login attempt (unknown account): {}", email);
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!("Credential lookup failed for {}: {:#}", email, e);
                return Err(AuthError::Internal(e));
            }
        };

        if !self.hasher.verify(password, &user.password_hash) {
            warn!("Failed login attempt (bad password): {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.issue(&user.email, user.role)?;

        info!("Login successful: {} ({})", user.email, user.role);

        Ok(LoginResponse {
            token,
            email: user.email,
            role: user.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::DEFAULT_TTL;
    use crate::auth::models::{Role, User};
    use anyhow::Result;
    use std::collections::HashMap;

    const SECRET: &str = "authenticator-test-secret-0123456789abcdef";

    struct MemoryStore {
        users: HashMap<String, User>,
    }

    impl CredentialStore for MemoryStore {
        fn find_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok(self.users.get(email).cloned())
        }
    }

    struct BrokenStore;

    impl CredentialStore for BrokenStore {
        fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
            anyhow::bail!("database is locked")
        }
    }

    fn setup() -> (Authenticator, Arc<JwtHandler>) {
        let hasher = PasswordHasher::new(crate::config::MIN_BCRYPT_COST);
        let user = User {
            id: 1,
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            password_hash: hasher.hash("password123").unwrap(),
            role: Role::Student,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let store = MemoryStore {
            users: HashMap::from([(user.email.clone(), user)]),
        };
        let jwt = Arc::new(JwtHandler::new(SECRET, DEFAULT_TTL).unwrap());
        (Authenticator::new(Arc::new(store), hasher, jwt.clone()), jwt)
    }

    #[test]
    fn test_login_success_returns_verifiable_token() {
        let (auth, jwt) = setup();

        let response = auth.login("sam@example.com", "password123").unwrap();
        assert_eq!(response.email, "sam@example.com");
        assert_eq!(response.role, Role::Student);

        let identity = jwt.verify(&response.token).unwrap();
        assert_eq!(identity.subject, "sam@example.com");
        assert_eq!(identity.role, Role::Student);
    }

    #[test]
    fn test_unknown_email_and_wrong_password_look_identical() {
        let (auth, _) = setup();

        let unknown = auth.login("nobody@example.com", "password123").unwrap_err();
        let wrong = auth.login("sam@example.com", "wrong-password").unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn test_email_match_is_exact() {
        let (auth, _) = setup();
        let err = auth.login("SAM@example.com", "password123").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_store_failure_is_internal() {
        let jwt = Arc::new(JwtHandler::new(SECRET, DEFAULT_TTL).unwrap());
        let auth = Authenticator::new(Arc::new(BrokenStore), PasswordHasher::new(crate::config::MIN_BCRYPT_COST), jwt);

        let err = auth.login("sam@example.com", "password123").unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
