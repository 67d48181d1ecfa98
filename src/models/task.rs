use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::auth::SubjectIdentity;
use crate::models::user::UserId;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started. New tasks start here unless told otherwise.
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

/// Client payload for creating or updating a task.
///
/// There is no owner field: the owner always comes from the authenticated identity, and any
/// `user_id` a client sends is ignored during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,

    /// Defaults to `todo` on create; left unchanged on update when absent.
    pub status: Option<TaskStatus>,
}

/// A task as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// The user who created the task. Never changes after creation.
    pub user_id: UserId,
}

/// List filters. Listing is always scoped to the caller; these only narrow further.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive match against title or description.
    pub search: Option<String>,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != Some(priority) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

/// A task ready to be inserted. Can only be built for an authenticated owner.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
}

impl NewTask {
    pub fn for_owner(input: TaskInput, owner: &SubjectIdentity, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status.unwrap_or_default(),
            due_date: input.due_date,
            created_at: now,
            user_id: owner.user_id,
        }
    }

    pub fn into_task(self) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.created_at,
            user_id: self.user_id,
        }
    }
}

impl Task {
    /// Applies an update payload. `id`, `user_id` and `created_at` are left untouched.
    pub fn apply(&mut self, input: TaskInput, now: DateTime<Utc>) {
        self.title = input.title;
        self.description = input.description;
        self.priority = input.priority;
        self.due_date = input.due_date;
        if let Some(status) = input.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}
