use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Credential, NewCredential, NewTask, Task, TaskQuery, UserId};
use crate::store::{CredentialStore, OwnerScope, StoreError, TaskStore};

#[derive(Default)]
struct Users {
    next_id: UserId,
    by_id: HashMap<UserId, Credential>,
}

/// Credential store kept in process memory. Used when no database is configured and by tests.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<Users>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        let users = self.users.read().await;
        Ok(users.by_id.values().find(|c| c.email == email).cloned())
    }

    async fn insert(&self, credential: NewCredential) -> Result<Credential, StoreError> {
        let mut users = self.users.write().await;

        if users.by_id.values().any(|c| c.email == credential.email) {
            return Err(StoreError::DuplicateEmail);
        }
        if users.by_id.values().any(|c| c.username == credential.username) {
            return Err(StoreError::DuplicateUsername);
        }

        users.next_id += 1;
        let stored = Credential {
            id: users.next_id,
            username: credential.username,
            email: credential.email,
            password_hash: credential.password_hash,
            created_at: Utc::now(),
        };
        users.by_id.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

/// Task store kept in process memory.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_by_owner(
        &self,
        scope: OwnerScope,
        query: &TaskQuery,
    ) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        let mut owned: Vec<Task> = tasks
            .values()
            .filter(|t| t.user_id == scope.owner_id() && query.matches(t))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let task = task.into_task();
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn save(&self, task: &Task) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task.id) {
            Some(stored) => {
                let (owner, created_at) = (stored.user_id, stored.created_at);
                *stored = Task {
                    user_id: owner,
                    created_at,
                    ..task.clone()
                };
                Ok(stored.clone())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.tasks.write().await.remove(&id);
        Ok(())
    }
}
