/// PostgreSQL credential store
///
/// Thin wrapper over the model functions. Unique-constraint violations
/// (SQLSTATE `23505`) are translated into the store's duplicate errors, which
/// is what makes the partial unique index on `(user_id, LOWER(title))` the
/// final word on title uniqueness even when two inserts race past the count
/// check.

use super::{CredentialStore, StoreError, StoreResult};
use crate::db::pool::health_check;
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, User};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

/// Store backed by a sqlx Postgres pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// Maps a unique violation to `on_conflict`, everything else to `Database`
fn map_conflict(err: sqlx::Error, on_conflict: StoreError) -> StoreError {
    if is_unique_violation(&err) {
        on_conflict
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, data)
            .await
            .map_err(|e| map_conflict(e, StoreError::DuplicateUsername))
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(&self, owner: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_owner(&self.pool, owner).await?)
    }

    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        Task::create(&self.pool, data)
            .await
            .map_err(|e| map_conflict(e, StoreError::DuplicateTitle))
    }

    async fn update_task(&self, id: Uuid, changes: UpdateTask) -> StoreResult<Option<Task>> {
        Task::update(&self.pool, id, changes)
            .await
            .map_err(|e| map_conflict(e, StoreError::DuplicateTitle))
    }

    async fn soft_delete_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::soft_delete(&self.pool, id).await?)
    }

    async fn count_tasks_matching_title(
        &self,
        owner: Uuid,
        title: &str,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<i64> {
        Ok(Task::count_matching_title(&self.pool, owner, title, exclude_id).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
