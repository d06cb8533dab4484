/// Integration tests for owner-scoped task CRUD

mod common;

use axum::http::{Method, StatusCode};
use common::TestContext;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = TestContext::new();
    let (token, user_id) = ctx.register("alice", "secret1").await;

    let created = ctx
        .post("/api/v1/tasks", Some(&token), json!({ "title": "Buy milk" }))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["title"], "Buy milk");
    assert_eq!(created.body["completed"], false);
    assert_eq!(created.body["user_id"], user_id.to_string());
    let id = created.body["id"].as_str().unwrap().to_string();

    let fetched = ctx.get(&format!("/api/v1/tasks/{}", id), Some(&token)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["id"], id);

    let updated = ctx
        .send(
            Method::PUT,
            &format!("/api/v1/tasks/{}", id),
            Some(&token),
            Some(json!({ "completed": true })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["completed"], true);
    assert_eq!(updated.body["title"], "Buy milk");

    let deleted = ctx
        .send(Method::DELETE, &format!("/api/v1/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(deleted.body["deleted_at"].is_string());

    let gone = ctx.get(&format!("/api/v1/tasks/{}", id), Some(&token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let list = ctx.get("/api/v1/tasks", Some(&token)).await;
    assert_eq!(list.body["count"], 0);
}

#[tokio::test]
async fn test_list_only_own_tasks() {
    let ctx = TestContext::new();
    let (alice, _) = ctx.register("alice", "secret1").await;
    let (bob, _) = ctx.register("bobby", "secret1").await;

    ctx.create_task(&alice, "first").await;
    ctx.create_task(&alice, "second").await;
    ctx.create_task(&bob, "bob's task").await;

    let list = ctx.get("/api/v1/tasks", Some(&alice)).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["count"], 2);

    let titles: Vec<&str> = list.body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["second", "first"]);
}

#[tokio::test]
async fn test_foreign_task_is_not_found() {
    let ctx = TestContext::new();
    let (alice, _) = ctx.register("alice", "secret1").await;
    let (bob, _) = ctx.register("bobby", "secret1").await;

    let task_id = ctx.create_task(&alice, "private").await;
    let uri = format!("/api/v1/tasks/{}", task_id);

    let get = ctx.get(&uri, Some(&bob)).await;
    let missing = ctx
        .get(&format!("/api/v1/tasks/{}", Uuid::new_v4()), Some(&bob))
        .await;
    assert_eq!(get.status, StatusCode::NOT_FOUND);
    assert_eq!(get.body, missing.body);

    let put = ctx
        .send(Method::PUT, &uri, Some(&bob), Some(json!({ "title": "hijacked" })))
        .await;
    assert_eq!(put.status, StatusCode::NOT_FOUND);

    let delete = ctx.send(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let still_there = ctx.get(&uri, Some(&alice)).await;
    assert_eq!(still_there.status, StatusCode::OK);
    assert_eq!(still_there.body["title"], "private");
}

#[tokio::test]
async fn test_invalid_task_id_is_not_found() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register("alice", "secret1").await;

    let res = ctx.get("/api/v1/tasks/not-a-uuid", Some(&token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_ignores_protected_fields() {
    let ctx = TestContext::new();
    let (alice, alice_id) = ctx.register("alice", "secret1").await;
    let (_, bob_id) = ctx.register("bobby", "secret1").await;

    let task_id = ctx.create_task(&alice, "mine").await;
    let uri = format!("/api/v1/tasks/{}", task_id);
    let before = ctx.get(&uri, Some(&alice)).await;

    let res = ctx
        .send(
            Method::PUT,
            &uri,
            Some(&alice),
            Some(json!({
                "id": Uuid::new_v4(),
                "user_id": bob_id,
                "created_at": "2000-01-01T00:00:00Z",
                "title": "renamed"
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["id"], task_id.to_string());
    assert_eq!(res.body["user_id"], alice_id.to_string());
    assert_eq!(res.body["created_at"], before.body["created_at"]);
    assert_eq!(res.body["title"], "renamed");
}

#[tokio::test]
async fn test_update_validation() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register("alice", "secret1").await;
    let uri = format!("/api/v1/tasks/{}", ctx.create_task(&token, "mine").await);

    for body in [
        json!({ "title": "" }),
        json!({ "title": 42 }),
        json!({ "completed": "yes" }),
        json!({ "title": "x".repeat(256) }),
        json!(["not", "an", "object"]),
    ] {
        let res = ctx.send(Method::PUT, &uri, Some(&token), Some(body.clone())).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body {}", body);
    }
}

#[tokio::test]
async fn test_create_validation() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register("alice", "secret1").await;

    let blank = ctx.post("/api/v1/tasks", Some(&token), json!({ "title": "" })).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let missing = ctx.post("/api/v1/tasks", Some(&token), json!({})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let spaces = ctx.post("/api/v1/tasks", Some(&token), json!({ "title": "   " })).await;
    assert_eq!(spaces.status, StatusCode::CREATED);
    assert_eq!(spaces.body["title"], "   ");
}

#[tokio::test]
async fn test_duplicate_title_per_owner() {
    let ctx = TestContext::new();
    let (alice, _) = ctx.register("alice", "secret1").await;
    let (bob, _) = ctx.register("bobby", "secret1").await;

    ctx.create_task(&alice, "Groceries").await;

    let dup = ctx
        .post("/api/v1/tasks", Some(&alice), json!({ "title": "GROCERIES" }))
        .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
    assert_eq!(dup.body["error"], "duplicate_title");

    let other_owner = ctx
        .post("/api/v1/tasks", Some(&bob), json!({ "title": "groceries" }))
        .await;
    assert_eq!(other_owner.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_rename_into_existing_title_conflicts() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register("alice", "secret1").await;

    ctx.create_task(&token, "Laundry").await;
    let other = ctx.create_task(&token, "Dishes").await;
    let uri = format!("/api/v1/tasks/{}", other);

    let clash = ctx
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "title": "laundry" })))
        .await;
    assert_eq!(clash.status, StatusCode::CONFLICT);

    // Keeping its own title in another case is fine
    let same = ctx
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "title": "DISHES" })))
        .await;
    assert_eq!(same.status, StatusCode::OK);
}

#[tokio::test]
async fn test_deleted_title_can_be_reused() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register("alice", "secret1").await;

    let id = ctx.create_task(&token, "Taxes").await;
    let deleted = ctx
        .send(Method::DELETE, &format!("/api/v1/tasks/{}", id), Some(&token), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let again = ctx.post("/api/v1/tasks", Some(&token), json!({ "title": "taxes" })).await;
    assert_eq!(again.status, StatusCode::CREATED);
}
