use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::identity::SubjectIdentity;
use crate::models::UserId;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Represents the claims encoded within a token.
///
/// `sub` and `email` default to empty when absent so that a signed token missing them is
/// reported as malformed rather than as an opaque decoding failure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The user's identifier, as a string.
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch. The token is valid strictly before this instant.
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    BadSignature,
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("token has expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies HS256-signed identity tokens.
///
/// The secret is fixed at construction and the current time is always passed in, so
/// `verify` depends only on its arguments and can be shared freely across threads.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a token for `user_id` valid from `now` until `now + ttl`.
    pub fn issue(
        &self,
        user_id: UserId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let issued_at = now.timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies the signature, then the payload, then the expiry against `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SubjectIdentity, TokenError> {
        let claims = self.decode_signed(token)?;

        if claims.sub.is_empty() {
            return Err(TokenError::Malformed("missing subject".into()));
        }
        if claims.email.is_empty() {
            return Err(TokenError::Malformed("missing email".into()));
        }
        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Malformed(format!("invalid subject {:?}", claims.sub)))?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(SubjectIdentity {
            user_id,
            email: claims.email,
        })
    }

    /// Checks the MAC and deserializes the payload. jsonwebtoken verifies the signature
    /// before it looks at the claims; expiry is ours to check against the injected clock.
    fn decode_signed(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}
