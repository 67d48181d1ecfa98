use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TaskInput, TaskQuery},
    tasks::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Lists the caller's tasks.
///
/// ## Query Parameters:
/// - `status` (optional): `todo`, `in_progress`, `review` or `done`.
/// - `priority` (optional): `low`, `medium`, `high` or `urgent`.
/// - `search` (optional): case-insensitive match on title or description.
///
/// ## Responses:
/// - `200 OK`: JSON array of the caller's tasks, newest first.
/// - `401 Unauthorized`: missing, malformed, or invalid token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskService>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = tasks.list(&user.0, &query_params).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the caller.
///
/// Any owner field in the body is ignored. `status` defaults to `todo`.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `401 Unauthorized`: missing, malformed, or invalid token.
/// - `422 Unprocessable Entity`: title empty or too long, description too long.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks.create(&user.0, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// ## Responses:
/// - `200 OK`: the task.
/// - `403 Forbidden`: the task belongs to another user.
/// - `404 Not Found`: no task with this id.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks.get(&user.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces the task's fields with the body. A missing `status` keeps the current one.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `403 Forbidden`: the task belongs to another user.
/// - `404 Not Found`: no task with this id.
/// - `422 Unprocessable Entity`: invalid body.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks
        .update(&user.0, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    tasks.delete(&user.0, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
