pub mod password;
pub mod permissions;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::DatabaseError;
use permissions::Role;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User '{0}' already exists")]
    DuplicateUser(String),

    #[error("User not found")]
    NotFound,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("{0}")]
    MalformedHeader(String),

    #[error("Unknown role: {0}")]
    InvalidRole(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Identity resolved by the authentication middleware and attached to the request.
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub token: String,
}

/// Signs and verifies self-contained bearer tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        })
    }

    pub fn issue(&self, username: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = i64::try_from(self.expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::TokenGeneration(format!("expiry of {} hours is out of range", self.expiry_hours))
            })?;
        let claims = Claims {
            sub: username.to_string(),
            role,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let signer = TokenSigner::new("test-secret", 1).unwrap();
        let token = signer.issue("tester1", Role::Admin).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, "tester1");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);

        // Verifying again does not depend on any server-side state
        assert_eq!(signer.verify(&token).unwrap().sub, "tester1");
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let signer = TokenSigner::new("test-secret", 1).unwrap();
        let other = TokenSigner::new("other-secret", 1).unwrap();
        let token = other.issue("tester1", Role::User).unwrap();

        assert!(matches!(signer.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let signer = TokenSigner::new("test-secret", 1).unwrap();
        assert!(matches!(signer.verify("not.a.jwt"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn oversized_expiry_fails_without_panicking() {
        let signer = TokenSigner::new("test-secret", u64::MAX).unwrap();
        assert!(matches!(signer.issue("tester1", Role::User), Err(AuthError::TokenGeneration(_))));

        let signer = TokenSigner::new("test-secret", i64::MAX as u64 / 3600).unwrap();
        assert!(matches!(signer.issue("tester1", Role::User), Err(AuthError::TokenGeneration(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenSigner::new("", 1), Err(AuthError::InvalidSecret)));
    }
}
