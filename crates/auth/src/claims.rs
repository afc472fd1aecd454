use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dashgate_core::UserId;

use crate::{Role, User};

/// Session token claims.
///
/// The role is a snapshot from issue time; servers should reload the user
/// before authorizing so role changes apply immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Deterministically validate the time window of a set of claims.
///
/// Signature checks happen in the codec; this only looks at timestamps.
pub fn validate_claims(
    claims: &SessionClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// Issues and verifies HS256-signed session tokens.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn claims_for(&self, user: &User, now: DateTime<Utc>) -> SessionClaims {
        SessionClaims {
            sub: user.id,
            role: user.role,
            issued_at: now,
            expires_at: now + self.ttl,
        }
    }

    pub fn encode(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.encode(&self.claims_for(user, now))
    }
}

impl TokenValidator for Hs256TokenCodec {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        // Expiry lives in our own RFC 3339 fields, not the registered `exp` claim.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserStatus;

    fn codec() -> Hs256TokenCodec {
        Hs256TokenCodec::new(b"test-secret", Duration::minutes(30))
    }

    fn user() -> User {
        User::new(
            UserId::new(),
            "t@example.com",
            "T",
            "K",
            Role::Editor,
            UserStatus::Active,
            Utc::now(),
        )
    }

    #[test]
    fn issued_token_validates() {
        let now = Utc::now();
        let user = user();
        let token = codec().issue(&user, now).unwrap();
        let claims = codec().validate(&token, now + Duration::minutes(1)).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Editor);
        assert_eq!(claims.expires_at - claims.issued_at, Duration::minutes(30));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let token = codec().issue(&user(), now).unwrap();
        let err = codec().validate(&token, now + Duration::minutes(30)).unwrap_err();
        assert_eq!(err, TokenError::Claims(TokenValidationError::Expired));
    }

    #[test]
    fn token_from_the_future_is_rejected() {
        let now = Utc::now();
        let token = codec().issue(&user(), now).unwrap();
        let err = codec().validate(&token, now - Duration::seconds(1)).unwrap_err();
        assert_eq!(err, TokenError::Claims(TokenValidationError::NotYetValid));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let token = codec().issue(&user(), now).unwrap();
        let other = Hs256TokenCodec::new(b"other-secret", Duration::minutes(30));
        assert!(matches!(other.validate(&token, now), Err(TokenError::Malformed(_))));
        assert!(matches!(codec().validate("garbage", now), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn inverted_window() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: UserId::new(),
            role: Role::Viewer,
            issued_at: now,
            expires_at: now,
        };
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::InvalidTimeWindow));
    }
}
