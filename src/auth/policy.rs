//! Authorization Policy
//! Mission: Map (method, path) to the access level a request needs

use crate::auth::models::{Role, VerifiedIdentity};
use axum::http::Method;

/// Access level required by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    RequireRole(Role),
    RequireAuthenticated,
}

/// Outcome of checking a request against its required access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No verified identity where one is needed (401)
    Unauthenticated,
    /// Identity present but with the wrong role (403)
    InsufficientRole,
}

/// Path matcher: exact path, or an ant-style `/**` subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Subtree(String),
}

impl PathPattern {
    /// `"/api/courses/**"` becomes a subtree rooted at `/api/courses`.
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(root) => PathPattern::Subtree(root.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == p,
            PathPattern::Subtree(root) => match path.strip_prefix(root.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    method: Option<Method>,
    pattern: PathPattern,
    access: Access,
}

impl Rule {
    pub fn any(pattern: &str, access: Access) -> Self {
        Self {
            method: None,
            pattern: PathPattern::parse(pattern),
            access,
        }
    }

    pub fn method(method: Method, pattern: &str, access: Access) -> Self {
        Self {
            method: Some(method),
            pattern: PathPattern::parse(pattern),
            access,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().map_or(true, |m| m == method) && self.pattern.matches(path)
    }
}

/// Ordered rule list; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<Rule>,
    fallback: Access,
}

impl AccessPolicy {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            fallback: Access::RequireAuthenticated,
        }
    }

    /// The role-checked rule table for the LMS API.
    pub fn standard() -> Self {
        use Access::*;

        Self::new(vec![
            Rule::any("/health", Public),
            Rule::any("/api/auth/**", Public),
            Rule::any("/api/users/register", Public),
            Rule::method(Method::POST, "/api/courses/add", RequireRole(Role::Admin)),
            Rule::method(Method::PUT, "/api/courses/**", RequireRole(Role::Admin)),
            Rule::method(Method::DELETE, "/api/courses/**", RequireRole(Role::Admin)),
            Rule::method(Method::GET, "/api/courses/**", RequireAuthenticated),
            Rule::any("/api/enrollments/enroll", RequireRole(Role::Student)),
            Rule::any("/api/enrollments/**", RequireAuthenticated),
        ])
    }

    pub fn required_access(&self, method: &Method, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.access)
            .unwrap_or(self.fallback)
    }

    pub fn decide(&self, method: &Method, path: &str, identity: Option<&VerifiedIdentity>) -> Decision {
        match (self.required_access(method, path), identity) {
            (Access::Public, _) => Decision::Allow,
            (_, None) => Decision::Unauthenticated,
            (Access::RequireAuthenticated, Some(_)) => Decision::Allow,
            (Access::RequireRole(role), Some(id)) if id.role == role => Decision::Allow,
            (Access::RequireRole(_), Some(_)) => Decision::InsufficientRole,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> VerifiedIdentity {
        VerifiedIdentity {
            subject: "someone@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_path_patterns() {
        let subtree = PathPattern::parse("/api/courses/**");
        assert!(subtree.matches("/api/courses"));
        assert!(subtree.matches("/api/courses/all"));
        assert!(subtree.matches("/api/courses/7"));
        assert!(!subtree.matches("/api/coursesX"));
        assert!(!subtree.matches("/api/enrollments"));

        let exact = PathPattern::parse("/api/users/register");
        assert!(exact.matches("/api/users/register"));
        assert!(!exact.matches("/api/users/register/extra"));
    }

    #[test]
    fn test_first_match_wins() {
        let policy = AccessPolicy::standard();

        // POST /api/courses/add is admin-only even though GET on the same subtree is open to any login
        assert_eq!(
            policy.required_access(&Method::POST, "/api/courses/add"),
            Access::RequireRole(Role::Admin)
        );
        assert_eq!(
            policy.required_access(&Method::GET, "/api/courses/all"),
            Access::RequireAuthenticated
        );
        assert_eq!(
            policy.required_access(&Method::POST, "/api/enrollments/enroll"),
            Access::RequireRole(Role::Student)
        );
        assert_eq!(
            policy.required_access(&Method::GET, "/api/enrollments/user/3"),
            Access::RequireAuthenticated
        );
    }

    #[test]
    fn test_public_routes() {
        let policy = AccessPolicy::standard();
        for (method, path) in [
            (Method::GET, "/health"),
            (Method::POST, "/api/auth/login"),
            (Method::GET, "/api/auth/me"),
            (Method::POST, "/api/users/register"),
        ] {
            assert_eq!(policy.decide(&method, path, None), Decision::Allow, "{method} {path}");
        }
    }

    #[test]
    fn test_unmatched_route_requires_authentication() {
        let policy = AccessPolicy::standard();
        assert_eq!(
            policy.required_access(&Method::GET, "/api/users/all"),
            Access::RequireAuthenticated
        );
        assert_eq!(
            policy.decide(&Method::GET, "/api/users/all", None),
            Decision::Unauthenticated
        );
        assert_eq!(
            policy.decide(&Method::GET, "/api/users/all", Some(&identity(Role::Student))),
            Decision::Allow
        );
    }

    #[test]
    fn test_role_decisions() {
        let policy = AccessPolicy::standard();
        let admin = identity(Role::Admin);
        let student = identity(Role::Student);

        assert_eq!(policy.decide(&Method::DELETE, "/api/courses/1", Some(&admin)), Decision::Allow);
        assert_eq!(
            policy.decide(&Method::DELETE, "/api/courses/1", Some(&student)),
            Decision::InsufficientRole
        );
        assert_eq!(
            policy.decide(&Method::DELETE, "/api/courses/1", None),
            Decision::Unauthenticated
        );

        assert_eq!(
            policy.decide(&Method::POST, "/api/enrollments/enroll", Some(&student)),
            Decision::Allow
        );
        assert_eq!(
            policy.decide(&Method::POST, "/api/enrollments/enroll", Some(&admin)),
            Decision::InsufficientRole
        );
    }

    #[test]
    fn test_custom_rules() {
        let policy = AccessPolicy::new(vec![Rule::any("/open/**", Access::Public)]);
        assert_eq!(policy.decide(&Method::GET, "/open/x", None), Decision::Allow);
        assert_eq!(policy.decide(&Method::GET, "/closed", None), Decision::Unauthenticated);
    }
}
