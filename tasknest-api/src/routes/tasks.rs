/// Task endpoints
///
/// All routes require a bearer token and only ever see the caller's own
/// tasks. Lookups by id go through the ownership check in
/// [`tasknest_shared::auth::authorization`], so another user's task id
/// answers 404 exactly like a nonexistent one.
///
/// - `GET    /api/v1/tasks` - List own tasks, newest first
/// - `POST   /api/v1/tasks` - Create a task
/// - `GET    /api/v1/tasks/:id` - Fetch one task
/// - `PUT    /api/v1/tasks/:id` - Partial update (`title`, `completed`)
/// - `DELETE /api/v1/tasks/:id` - Soft delete, returns the deleted task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tasknest_shared::{
    auth::{authorization, middleware::AuthContext},
    models::task::Task,
};
use uuid::Uuid;

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
}

/// List tasks response
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub count: usize,
}

/// Unparseable ids can't name a task the caller owns
fn task_id(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

/// Lists the caller's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = state.store.list_tasks(auth.user_id).await?;

    Ok(Json(TaskListResponse {
        count: tasks.len(),
        tasks,
    }))
}

/// Creates a task owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: Title missing, empty, or longer than 255 characters
/// - `409 Conflict`: Caller already has a task with this title (any case)
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = payload?;

    let task = authorization::create_owned_task(state.store.as_ref(), &auth, req.title).await?;
    tracing::info!(task_id = %task.id, user_id = %auth.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetches one of the caller's tasks
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let id = task_id(path)?;
    let task = authorization::require_owned_task(state.store.as_ref(), &auth, id).await?;

    Ok(Json(task))
}

/// Updates one of the caller's tasks
///
/// `id`, `user_id` and timestamps in the body are ignored.
///
/// # Errors
///
/// - `400 Bad Request`: `title` not a valid title, or `completed` not a boolean
/// - `404 Not Found`: Task missing or not the caller's
/// - `409 Conflict`: New title clashes with another of the caller's tasks
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let id = task_id(path)?;
    let Json(body) = payload?;

    let task = authorization::update_owned_task(state.store.as_ref(), &auth, id, body).await?;
    tracing::info!(task_id = %task.id, user_id = %auth.user_id, "Task updated");

    Ok(Json(task))
}

/// Soft-deletes one of the caller's tasks
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let id = task_id(path)?;

    let task = authorization::delete_owned_task(state.store.as_ref(), &auth, id).await?;
    tracing::info!(task_id = %task.id, user_id = %auth.user_id, "Task deleted");

    Ok(Json(task))
}
