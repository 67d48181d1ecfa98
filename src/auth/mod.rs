pub mod extractors;
pub mod identity;
pub mod middleware;
pub mod ownership;
pub mod password;
pub mod service;
pub mod token;

use lazy_static::lazy_static;
use serde::Deserialize;
use validator::Validate;

pub use extractors::AuthenticatedUser;
pub use identity::{AuthError, IdentityExtractor, SubjectIdentity};
pub use middleware::AuthMiddleware;
pub use ownership::{Authorized, Owned, OwnershipError, OwnershipGuard};
pub use password::{PasswordError, PasswordHasher};
pub use service::{AuthenticationService, IssuedToken, LoginError, RegistrationError};
pub use token::{Claims, TokenCodec, TokenError};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Payload for `POST /api/auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Payload for `POST /api/auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// 3 to 32 characters: letters, digits, underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Counted in bytes at the upper end, since bcrypt ignores anything past 72 bytes.
    #[validate(
        length(min = 5),
        custom = "validate_password_bytes"
    )]
    pub password: String,
}

fn validate_password_bytes(password: &str) -> Result<(), validator::ValidationError> {
    if password.len() > password::MAX_PASSWORD_BYTES {
        return Err(validator::ValidationError::new("password_too_long"));
    }
    Ok(())
}
