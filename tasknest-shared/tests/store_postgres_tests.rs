/// Integration tests for PgStore
///
/// Skipped unless DATABASE_URL is set; see tests/common/mod.rs.

mod common;

use tasknest_shared::models::task::{CreateTask, UpdateTask};
use tasknest_shared::models::user::CreateUser;
use tasknest_shared::store::{CredentialStore, PgStore, StoreError};

async fn store() -> Option<PgStore> {
    common::test_pool().await.map(PgStore::new)
}

fn new_user(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
    }
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let Some(store) = store().await else {
        return;
    };
    let username = common::unique_username("dup");

    let user = store.insert_user(new_user(&username)).await.unwrap();
    assert!(matches!(
        store.insert_user(new_user(&username)).await,
        Err(StoreError::DuplicateUsername)
    ));

    let found = store.find_user_by_username(&username).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert!(store.find_user_by_username(&username.to_uppercase()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_title_index_rejects_case_insensitive_duplicate() {
    let Some(store) = store().await else {
        return;
    };
    let owner = store.insert_user(new_user(&common::unique_username("idx"))).await.unwrap();
    let other = store.insert_user(new_user(&common::unique_username("idx"))).await.unwrap();

    store
        .insert_task(CreateTask { user_id: owner.id, title: "Pay rent".to_string() })
        .await
        .unwrap();

    // Bypasses the count check entirely; only the index stands in the way
    assert!(matches!(
        store
            .insert_task(CreateTask { user_id: owner.id, title: "PAY RENT".to_string() })
            .await,
        Err(StoreError::DuplicateTitle)
    ));
    store
        .insert_task(CreateTask { user_id: other.id, title: "Pay rent".to_string() })
        .await
        .unwrap();

    assert_eq!(
        store.count_tasks_matching_title(owner.id, "pay RENT", None).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_update_and_soft_delete() {
    let Some(store) = store().await else {
        return;
    };
    let owner = store.insert_user(new_user(&common::unique_username("upd"))).await.unwrap();

    let task = store
        .insert_task(CreateTask { user_id: owner.id, title: "Draft".to_string() })
        .await
        .unwrap();
    assert!(!task.completed);

    let updated = store
        .update_task(task.id, UpdateTask { title: Some("Final".to_string()), completed: Some(true) })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Final");
    assert!(updated.completed);
    assert_eq!(updated.user_id, owner.id);

    let deleted = store.soft_delete_task(task.id).await.unwrap().unwrap();
    assert!(deleted.deleted_at.is_some());
    assert!(store.find_task(task.id).await.unwrap().is_none());
    assert!(store.list_tasks(owner.id).await.unwrap().is_empty());

    // Title is free again once the old task is deleted
    store
        .insert_task(CreateTask { user_id: owner.id, title: "final".to_string() })
        .await
        .unwrap();
}
