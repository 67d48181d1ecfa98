use bcrypt::{hash, verify};
use thiserror::Error;

/// bcrypt only reads this many bytes of input. Longer passwords are rejected at
/// registration so two different passwords can never share a digest.
pub const MAX_PASSWORD_BYTES: usize = 72;

pub const DEFAULT_COST: u32 = 12;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hashing(String),
    #[error("stored password digest is malformed: {0}")]
    MalformedDigest(String),
}

/// Salted one-way password hashing backed by bcrypt.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// `cost` is the bcrypt work factor (4..=31).
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Every call draws a fresh salt, so hashing the same password twice gives two
    /// different digests.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash(password, self.cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Returns `Ok(false)` on mismatch. Only a digest that cannot be parsed is an error.
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError> {
        verify(password, digest).map_err(|e| PasswordError::MalformedDigest(e.to_string()))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}
