//! Task operations for an authenticated caller.
//!
//! Every single-task operation loads the row and runs it through the ownership guard before
//! anything is returned or written. Listing never loads other users' rows at all: the store
//! only accepts an [`OwnerScope`] built from the caller's identity.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{Authorized, OwnershipError, OwnershipGuard, SubjectIdentity};
use crate::models::{NewTask, Task, TaskInput, TaskQuery};
use crate::store::{OwnerScope, StoreError, TaskStore};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task not found")]
    NotFound,
    #[error(transparent)]
    NotOwner(#[from] OwnershipError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for TaskError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => TaskError::NotFound,
            other => TaskError::Store(other),
        }
    }
}

pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        subject: &SubjectIdentity,
        query: &TaskQuery,
    ) -> Result<Vec<Task>, TaskError> {
        Ok(self
            .store
            .list_by_owner(OwnerScope::from(subject), query)
            .await?)
    }

    /// The owner is the caller. No ownership check is needed.
    pub async fn create(
        &self,
        subject: &SubjectIdentity,
        input: TaskInput,
    ) -> Result<Task, TaskError> {
        let task = self
            .store
            .insert(NewTask::for_owner(input, subject, Utc::now()))
            .await?;
        log::debug!("user {} created task {}", subject.user_id, task.id);
        Ok(task)
    }

    pub async fn get(&self, subject: &SubjectIdentity, id: Uuid) -> Result<Task, TaskError> {
        Ok(self.load_authorized(subject, id).await?.into_inner())
    }

    pub async fn update(
        &self,
        subject: &SubjectIdentity,
        id: Uuid,
        input: TaskInput,
    ) -> Result<Task, TaskError> {
        let mut task = self.load_authorized(subject, id).await?.into_inner();
        task.apply(input, Utc::now());
        Ok(self.store.save(&task).await?)
    }

    pub async fn delete(&self, subject: &SubjectIdentity, id: Uuid) -> Result<(), TaskError> {
        let task = self.load_authorized(subject, id).await?;
        self.store.delete_by_id(task.id).await?;
        log::debug!("user {} deleted task {}", subject.user_id, id);
        Ok(())
    }

    async fn load_authorized(
        &self,
        subject: &SubjectIdentity,
        id: Uuid,
    ) -> Result<Authorized<Task>, TaskError> {
        let task = self.store.find_by_id(id).await?.ok_or(TaskError::NotFound)?;
        OwnershipGuard::authorize_resource(subject, task).map_err(|e| {
            log::info!("user {} denied access to task {}", subject.user_id, id);
            TaskError::from(e)
        })
    }
}
