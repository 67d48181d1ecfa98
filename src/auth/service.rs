use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::password::{PasswordError, PasswordHasher};
use crate::auth::token::{TokenCodec, TokenError};
use crate::models::{NewCredential, User, UserId};
use crate::store::{CredentialStore, StoreError};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("username already taken")]
    DuplicateUsername,
    #[error(transparent)]
    Hashing(#[from] PasswordError),
    #[error("credential store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RegistrationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateEmail => RegistrationError::DuplicateEmail,
            StoreError::DuplicateUsername => RegistrationError::DuplicateUsername,
            other => RegistrationError::Store(other),
        }
    }
}

/// Login failures. `UserNotFound` and `InvalidPassword` are kept apart for server-side logs
/// only; the HTTP layer renders them identically.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("no credential for this email")]
    UserNotFound,
    #[error("password does not match")]
    InvalidPassword,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("credential store failure: {0}")]
    Store(#[from] StoreError),
}

/// A freshly signed token and what it was issued for. `expires_at` matches the token's
/// `exp` claim, in whole seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Registration and login. The only component that touches password digests and signs
/// tokens.
pub struct AuthenticationService {
    credentials: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: TokenCodec,
    /// Verified against on unknown emails so both login failures spend one bcrypt verify.
    dummy_digest: Option<String>,
}

const DUMMY_PASSWORD: &str = "no-such-user-placeholder";

impl AuthenticationService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        codec: TokenCodec,
    ) -> Self {
        let dummy_digest = match hasher.hash(DUMMY_PASSWORD) {
            Ok(digest) => Some(digest),
            Err(e) => {
                log::warn!("could not prepare dummy password digest: {}", e);
                None
            }
        };
        Self {
            credentials,
            hasher,
            codec,
            dummy_digest,
        }
    }

    /// Stores a new credential and returns its public profile.
    ///
    /// Uniqueness is left to the store, so two concurrent registrations for the same email
    /// cannot both succeed.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, RegistrationError> {
        let password_hash = self.hasher.hash(password)?;

        let credential = self
            .credentials
            .insert(NewCredential {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        log::info!("registered user {}", credential.id);
        Ok(credential.profile())
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, LoginError> {
        let credential = match self.credentials.find_by_email(email).await? {
            Some(credential) => credential,
            None => {
                if let Some(digest) = &self.dummy_digest {
                    let _ = self.hasher.verify(password, digest);
                }
                log::info!("login rejected: unknown email");
                return Err(LoginError::UserNotFound);
            }
        };

        if !self.hasher.verify(password, &credential.password_hash)? {
            log::info!("login rejected: wrong password for user {}", credential.id);
            return Err(LoginError::InvalidPassword);
        }

        let expires_at = now
            .trunc_subsecs(0)
            .checked_add_signed(self.codec.ttl())
            .ok_or_else(|| TokenError::Signing("expiry is out of range".into()))?;
        let token = self.codec.issue(credential.id, &credential.email, now)?;
        Ok(IssuedToken {
            token,
            user_id: credential.id,
            expires_at,
        })
    }
}
