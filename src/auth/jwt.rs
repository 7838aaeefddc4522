//! JWT Token Handler
//! Mission: Issue and verify signed, self-contained session tokens

use crate::auth::models::{Claims, Role, VerifiedIdentity};
use crate::config::ConfigError;
use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::time::Duration;
use tracing::debug;

/// Minimum signing key length, in characters.
pub const MIN_SECRET_LEN: usize = 32;

/// Default token lifetime (10 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60 * 60);

/// Why a presented token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token has expired")]
    Expired,
}

/// JWT Handler for token operations (HS256)
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    leeway_secs: u64,
}

impl JwtHandler {
    /// Create a handler from the process signing key.
    ///
    /// Keys shorter than [`MIN_SECRET_LEN`] characters are rejected.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, ConfigError> {
        let length = secret.chars().count();
        if length < MIN_SECRET_LEN {
            return Err(ConfigError::SigningKeyTooShort {
                length,
                minimum: MIN_SECRET_LEN,
            });
        }

        // Expiry is checked by hand so that `exp == now` counts as expired.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            leeway_secs: 0,
        })
    }

    /// Grace period applied to the expiry comparison.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` carrying `role`.
    pub fn issue(&self, subject: &str, role: Role) -> Result<String> {
        self.issue_at(subject, role, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, subject: &str, role: Role, now: i64) -> Result<String> {
        let ttl_secs = i64::try_from(self.ttl.as_secs()).context("Token TTL out of range")?;
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now.checked_add(ttl_secs).context("Invalid timestamp")?,
        };

        debug!(
            "Issuing JWT for {} ({}), expires in {}s",
            subject, role, ttl_secs
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to generate JWT")
    }

    /// Verify signature and expiry, returning the identity the token carries.
    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub(crate) fn verify_at(&self, token: &str, now: i64) -> Result<VerifiedIdentity, TokenError> {
        // jsonwebtoken compares the signature segment as text, so an
        // undecodable signature would otherwise read as a bad signature
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || URL_SAFE_NO_PAD.decode(segments[2]).is_err() {
            return Err(TokenError::Malformed);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?
            .claims;

        let leeway = i64::try_from(self.leeway_secs).unwrap_or(i64::MAX);
        if claims.exp.saturating_add(leeway) <= now {
            return Err(TokenError::Expired);
        }

        Ok(claims.into())
    }
}
