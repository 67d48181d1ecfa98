use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::token::TokenCodec;
use crate::models::UserId;

const BEARER_SCHEME: &str = "Bearer";

/// The verified identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectIdentity {
    pub user_id: UserId,
    pub email: String,
}

/// Why a request could not be tied to an identity.
///
/// Token failures of every kind collapse into `InvalidCredential`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,
    #[error("malformed credential")]
    MalformedCredential,
    #[error("invalid credential")]
    InvalidCredential,
}

/// Turns a raw `Authorization` header value into a [`SubjectIdentity`].
#[derive(Clone)]
pub struct IdentityExtractor {
    codec: TokenCodec,
}

impl IdentityExtractor {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    pub fn extract(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SubjectIdentity, AuthError> {
        let value = match header {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthError::MissingCredential),
        };

        let token = parse_bearer(value).ok_or(AuthError::MalformedCredential)?;

        self.codec.verify(token, now).map_err(|e| {
            log::debug!("rejected bearer token: {}", e);
            AuthError::InvalidCredential
        })
    }
}

/// Accepts exactly `"Bearer <token>"`: the case-sensitive scheme, one space, and a
/// non-empty token with no further spaces.
fn parse_bearer(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}
