//! Persistence ports for credentials and tasks, with Postgres and in-memory adapters.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::SubjectIdentity;
use crate::models::{Credential, NewCredential, NewTask, Task, TaskQuery, UserId};

pub use memory::{MemoryCredentialStore, MemoryTaskStore};
pub use postgres::{PgCredentialStore, PgTaskStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("username already taken")]
    DuplicateUsername,
    #[error("row not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The owner a task listing is restricted to.
///
/// Only obtainable from a verified [`SubjectIdentity`], which is what keeps list queries from
/// ever being issued for someone else's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope(UserId);

impl OwnerScope {
    pub fn owner_id(&self) -> UserId {
        self.0
    }
}

impl From<&SubjectIdentity> for OwnerScope {
    fn from(identity: &SubjectIdentity) -> Self {
        OwnerScope(identity.user_id)
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError>;

    /// Fails with `DuplicateEmail` or `DuplicateUsername` when a uniqueness constraint is hit.
    async fn insert(&self, credential: NewCredential) -> Result<Credential, StoreError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Newest first.
    async fn list_by_owner(
        &self,
        scope: OwnerScope,
        query: &TaskQuery,
    ) -> Result<Vec<Task>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError>;

    /// Writes the mutable fields of `task`. The owner column is never rewritten.
    /// Fails with `NotFound` when the row no longer exists.
    async fn save(&self, task: &Task) -> Result<Task, StoreError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;
}
