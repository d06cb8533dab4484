/// Credential and task storage
///
/// Everything the API needs from persistence sits behind the
/// [`CredentialStore`] trait so handlers never touch SQL directly:
///
/// - [`PgStore`]: PostgreSQL, backed by the functions in [`crate::models`]
/// - [`MemoryStore`]: in-process maps under a single lock, used by tests
///   and local runs without a database
///
/// Both implementations enforce the same uniqueness rules: usernames are
/// unique (case-sensitive), and a user's live task titles are unique
/// case-insensitively. A violation surfaces as the matching `Duplicate*`
/// variant of [`StoreError`] regardless of which backend caught it.
///
/// # Example
///
/// ```
/// use tasknest_shared::store::{CredentialStore, MemoryStore};
/// use tasknest_shared::models::user::CreateUser;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store
///     .insert_user(CreateUser {
///         username: "alice".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     })
///     .await?;
///
/// assert!(store.find_user_by_username("alice").await?.is_some());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, User};
use async_trait::async_trait;
use uuid::Uuid;

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Username already registered
    #[error("Username already exists")]
    DuplicateUsername,

    /// Owner already has a live task with this title (case-insensitive)
    #[error("Task with this title already exists")]
    DuplicateTitle,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations used by the auth and task handlers
///
/// Lookups that find nothing return `Ok(None)`. Task lookups never return
/// soft-deleted tasks. Ownership is not checked here; callers go through
/// [`crate::auth::authorization::require_owned_task`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive username lookup
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Inserts a user atomically; a taken username is `DuplicateUsername`
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Live tasks of one owner, newest first
    async fn list_tasks(&self, owner: Uuid) -> StoreResult<Vec<Task>>;

    /// Inserts a task; a live case-insensitive title clash is `DuplicateTitle`
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task>;

    /// Applies a partial update; `Ok(None)` if the task is gone
    async fn update_task(&self, id: Uuid, changes: UpdateTask) -> StoreResult<Option<Task>>;

    /// Soft-deletes a task and returns it; `Ok(None)` if already gone
    async fn soft_delete_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Counts the owner's live tasks whose title equals `title` ignoring case,
    /// leaving `exclude_id` out of the count
    async fn count_tasks_matching_title(
        &self,
        owner: Uuid,
        title: &str,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<i64>;

    /// Connectivity check for the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}
