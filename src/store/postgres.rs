use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Credential, NewCredential, NewTask, Task, TaskQuery};
use crate::store::{CredentialStore, OwnerScope, StoreError, TaskStore};

const TASK_COLUMNS: &str =
    "id, title, description, priority, status, due_date, created_at, updated_at, user_id";

/// Maps a unique violation on the users table to the matching domain error.
fn map_user_insert_error(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return match db_error.constraint() {
                Some(constraint) if constraint.contains("username") => {
                    StoreError::DuplicateUsername
                }
                _ => StoreError::DuplicateEmail,
            };
        }
    }
    StoreError::Database(error)
}

/// SQL for a filtered listing. The owner is always `$1`; filters that are present take the
/// following placeholders in the order status, priority, search. Binds must follow that order.
fn list_by_owner_sql(query: &TaskQuery) -> String {
    let mut sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
    let mut param_count = 2;

    if query.status.is_some() {
        sql.push_str(&format!(" AND status = ${}", param_count));
        param_count += 1;
    }
    if query.priority.is_some() {
        sql.push_str(&format!(" AND priority = ${}", param_count));
        param_count += 1;
    }
    if query.search.is_some() {
        sql.push_str(&format!(
            " AND (title ILIKE ${0} OR description ILIKE ${0})",
            param_count
        ));
    }
    sql.push_str(" ORDER BY created_at DESC");
    sql
}

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credential)
    }

    async fn insert(&self, credential: NewCredential) -> Result<Credential, StoreError> {
        sqlx::query_as::<_, Credential>(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3)
             RETURNING id, username, email, password_hash, created_at",
        )
        .bind(&credential.username)
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_insert_error)
    }
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list_by_owner(
        &self,
        scope: OwnerScope,
        query: &TaskQuery,
    ) -> Result<Vec<Task>, StoreError> {
        let sql = list_by_owner_sql(query);
        let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(scope.owner_id());
        if let Some(status) = query.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(priority) = query.priority {
            query_builder = query_builder.bind(priority);
        }
        if let Some(search) = &query.search {
            query_builder = query_builder.bind(format!("%{}%", search));
        }

        Ok(query_builder.fetch_all(&self.pool).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let task =
            sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(task)
    }

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let created = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, title, description, priority, status, due_date, created_at, updated_at, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn save(&self, task: &Task) -> Result<Task, StoreError> {
        let saved = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = $1, description = $2, priority = $3, status = $4, due_date = $5, updated_at = $6
             WHERE id = $7
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.updated_at)
        .bind(task.id)
        .fetch_optional(&self.pool)
        .await?;
        saved.ok_or(StoreError::NotFound)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
