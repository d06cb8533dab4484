/// Task ownership enforcement
///
/// Every read, update and delete of a task goes through
/// [`require_owned_task`] first. A task that belongs to someone else is
/// reported exactly like a task that does not exist, so callers cannot probe
/// for other users' task ids.
///
/// Update payloads arrive as raw JSON and are cleaned by
/// [`sanitize_task_update`] before anything else looks at them: the
/// server-managed fields in [`PROTECTED_FIELDS`] are dropped without
/// complaint, then `title` and `completed` are type- and range-checked.
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::authorization::sanitize_task_update;
/// use serde_json::json;
/// use uuid::Uuid;
///
/// let changes = sanitize_task_update(json!({
///     "id": Uuid::new_v4(),
///     "user_id": Uuid::new_v4(),
///     "title": "Renamed",
///     "completed": true,
/// }))
/// .unwrap();
///
/// assert_eq!(changes.title.as_deref(), Some("Renamed"));
/// assert_eq!(changes.completed, Some(true));
/// ```

use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::task::{validate_title, CreateTask, Task, UpdateTask};
use crate::store::{CredentialStore, StoreError};

/// Fields a client may send on update but never change
pub const PROTECTED_FIELDS: [&str; 5] = ["id", "user_id", "created_at", "updated_at", "deleted_at"];

/// Error type for ownership checks and task mutations
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Task missing, deleted, or owned by someone else
    #[error("Task not found")]
    NotFound,

    /// A field failed validation
    #[error("Invalid {field}: {message}")]
    InvalidField { field: &'static str, message: String },

    /// Owner already has a live task with this title
    #[error("Task with this title already exists")]
    DuplicateTitle,

    /// Store failure
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthzError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateTitle => AuthzError::DuplicateTitle,
            other => AuthzError::Store(other),
        }
    }
}

/// Loads a task and checks the caller owns it
///
/// # Errors
///
/// `AuthzError::NotFound` if the task is absent, soft-deleted, or owned by
/// another user.
pub async fn require_owned_task(
    store: &dyn CredentialStore,
    auth: &AuthContext,
    task_id: Uuid,
) -> Result<Task, AuthzError> {
    let task = store.find_task(task_id).await?.ok_or(AuthzError::NotFound)?;

    if task.user_id != auth.user_id {
        tracing::warn!(
            task_id = %task_id,
            user_id = %auth.user_id,
            "Task access denied: not owner"
        );
        return Err(AuthzError::NotFound);
    }

    Ok(task)
}

/// Strips protected fields from an update payload and validates the rest
///
/// Unknown fields are ignored. An empty result is valid and only bumps
/// `updated_at`.
pub fn sanitize_task_update(payload: JsonValue) -> Result<UpdateTask, AuthzError> {
    let JsonValue::Object(mut fields) = payload else {
        return Err(AuthzError::InvalidField {
            field: "body",
            message: "Expected a JSON object".to_string(),
        });
    };

    for protected in PROTECTED_FIELDS {
        fields.remove(protected);
    }

    let mut changes = UpdateTask::default();

    if let Some(title) = fields.remove("title") {
        let JsonValue::String(title) = title else {
            return Err(AuthzError::InvalidField {
                field: "title",
                message: "Title must be a string".to_string(),
            });
        };
        validate_title(&title).map_err(|message| AuthzError::InvalidField {
            field: "title",
            message,
        })?;
        changes.title = Some(title);
    }

    if let Some(completed) = fields.remove("completed") {
        let JsonValue::Bool(completed) = completed else {
            return Err(AuthzError::InvalidField {
                field: "completed",
                message: "Completed must be a boolean".to_string(),
            });
        };
        changes.completed = Some(completed);
    }

    Ok(changes)
}

/// Fails with `DuplicateTitle` if the owner has another live task with this
/// title, ignoring case
pub async fn ensure_title_available(
    store: &dyn CredentialStore,
    owner: Uuid,
    title: &str,
    exclude_id: Option<Uuid>,
) -> Result<(), AuthzError> {
    if store.count_tasks_matching_title(owner, title, exclude_id).await? > 0 {
        return Err(AuthzError::DuplicateTitle);
    }

    Ok(())
}

/// Creates a task owned by the caller
pub async fn create_owned_task(
    store: &dyn CredentialStore,
    auth: &AuthContext,
    title: String,
) -> Result<Task, AuthzError> {
    validate_title(&title).map_err(|message| AuthzError::InvalidField {
        field: "title",
        message,
    })?;
    ensure_title_available(store, auth.user_id, &title, None).await?;

    // The store re-checks uniqueness; a racing insert still ends in DuplicateTitle
    Ok(store
        .insert_task(CreateTask {
            user_id: auth.user_id,
            title,
        })
        .await?)
}

/// Updates a task the caller owns from a raw JSON payload
///
/// Ownership is checked before the payload is even parsed.
pub async fn update_owned_task(
    store: &dyn CredentialStore,
    auth: &AuthContext,
    task_id: Uuid,
    payload: JsonValue,
) -> Result<Task, AuthzError> {
    let task = require_owned_task(store, auth, task_id).await?;
    let changes = sanitize_task_update(payload)?;

    if let Some(title) = &changes.title {
        ensure_title_available(store, task.user_id, title, Some(task.id)).await?;
    }

    store
        .update_task(task.id, changes)
        .await?
        .ok_or(AuthzError::NotFound)
}

/// Soft-deletes a task the caller owns and returns it
pub async fn delete_owned_task(
    store: &dyn CredentialStore,
    auth: &AuthContext,
    task_id: Uuid,
) -> Result<Task, AuthzError> {
    let task = require_owned_task(store, auth, task_id).await?;

    store
        .soft_delete_task(task.id)
        .await?
        .ok_or(AuthzError::NotFound)
}
