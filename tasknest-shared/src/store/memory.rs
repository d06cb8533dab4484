/// In-memory credential store
///
/// Holds users and tasks in maps behind one `RwLock`. Each write takes the
/// lock for the whole check-and-insert, so uniqueness holds under concurrent
/// requests just as the database constraints do. Data lives as long as the
/// store value.

use super::{CredentialStore, StoreError, StoreResult};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::user::{CreateUser, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    tasks: HashMap<Uuid, StoredTask>,
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct StoredTask {
    /// Insertion order, breaks `created_at` ties when listing
    seq: u64,
    task: Task,
}

impl Inner {
    fn title_taken(&self, owner: Uuid, title: &str, exclude_id: Option<Uuid>) -> bool {
        let wanted = title.to_lowercase();
        self.tasks.values().any(|stored| {
            let t = &stored.task;
            t.user_id == owner
                && t.deleted_at.is_none()
                && Some(t.id) != exclude_id
                && t.title.to_lowercase() == wanted
        })
    }

    fn live_task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks
            .get_mut(&id)
            .map(|stored| &mut stored.task)
            .filter(|task| task.deleted_at.is_none())
    }
}

/// Store kept entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of registered users
    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.username == data.username) {
            return Err(StoreError::DuplicateUsername);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .get(&id)
            .map(|stored| stored.task.clone())
            .filter(|task| task.deleted_at.is_none()))
    }

    async fn list_tasks(&self, owner: Uuid) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;

        let mut owned: Vec<&StoredTask> = inner
            .tasks
            .values()
            .filter(|s| s.task.user_id == owner && s.task.deleted_at.is_none())
            .collect();
        owned.sort_by(|a, b| {
            b.task
                .created_at
                .cmp(&a.task.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(owned.into_iter().map(|s| s.task.clone()).collect())
    }

    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut inner = self.inner.write().await;

        if inner.title_taken(data.user_id, &data.title, None) {
            return Err(StoreError::DuplicateTitle);
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            title: data.title,
            completed: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.tasks.insert(
            task.id,
            StoredTask {
                seq,
                task: task.clone(),
            },
        );

        Ok(task)
    }

    async fn update_task(&self, id: Uuid, changes: UpdateTask) -> StoreResult<Option<Task>> {
        let mut inner = self.inner.write().await;

        let owner = match inner.live_task_mut(id) {
            Some(task) => task.user_id,
            None => return Ok(None),
        };

        if let Some(title) = &changes.title {
            if inner.title_taken(owner, title, Some(id)) {
                return Err(StoreError::DuplicateTitle);
            }
        }

        let Some(task) = inner.live_task_mut(id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(completed) = changes.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn soft_delete_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let mut inner = self.inner.write().await;

        Ok(inner.live_task_mut(id).map(|task| {
            let now = Utc::now();
            task.deleted_at = Some(now);
            task.updated_at = now;
            task.clone()
        }))
    }

    async fn count_tasks_matching_title(
        &self,
        owner: Uuid,
        title: &str,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<i64> {
        let inner = self.inner.read().await;
        let wanted = title.to_lowercase();

        let count = inner
            .tasks
            .values()
            .filter(|s| {
                s.task.user_id == owner
                    && s.task.deleted_at.is_none()
                    && Some(s.task.id) != exclude_id
                    && s.task.title.to_lowercase() == wanted
            })
            .count();

        Ok(count as i64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
