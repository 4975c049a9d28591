use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::TestApp;

async fn create_todo(app: &TestApp, token: &str, title: &str, completed: bool) -> i64 {
    let (status, body) = app
        .post(
            "/api/todos",
            token,
            json!({ "title": title, "description": "something to do", "completed": completed }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["todo"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn can_create_and_fetch_a_todo() {
    let app = TestApp::new().await.unwrap();
    let (user, token) = app.login_as("alice@example.com").await.unwrap();

    let (status, body) = app
        .post(
            "/api/todos",
            &token,
            json!({ "title": "  Buy milk ", "description": "Two litres" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Successfully created the new todo");
    assert_eq!(body["todo"]["title"], "Buy milk");
    assert_eq!(body["todo"]["completed"], false);
    assert_eq!(body["todo"]["userId"], user.id);

    let id = body["todo"]["id"].as_i64().unwrap();
    let (status, body) = app.get(&format!("/api/todos/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"]["description"], "Two litres");
}

#[tokio::test]
async fn rejects_todo_without_title() {
    let app = TestApp::new().await.unwrap();
    let (_, token) = app.login_as("alice@example.com").await.unwrap();

    let (status, body) = app
        .post("/api/todos", &token, json!({ "description": "No title" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please enter a title");
}

#[tokio::test]
async fn rejects_malformed_json() {
    let app = TestApp::new().await.unwrap();
    let (_, token) = app.login_as("alice@example.com").await.unwrap();

    let (status, body) = app
        .post("/api/todos", &token, json!({ "title": 42 }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn lists_only_own_todos_with_status_filter() {
    let app = TestApp::new().await.unwrap();
    let (_, alice) = app.login_as("alice@example.com").await.unwrap();
    let (_, bob) = app.login_as("bob@example.com").await.unwrap();

    create_todo(&app, &alice, "first", false).await;
    create_todo(&app, &alice, "second", true).await;
    create_todo(&app, &bob, "bobs", false).await;

    let (status, body) = app.get("/api/todos", &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (_, body) = app.get("/api/todos?status=completed", &alice).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["todos"][0]["title"], "second");

    let (_, body) = app.get("/api/todos?status=pending", &alice).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["todos"][0]["title"], "first");
}

#[tokio::test]
async fn lists_todos_sorted_by_title() {
    let app = TestApp::new().await.unwrap();
    let (_, token) = app.login_as("alice@example.com").await.unwrap();
    for title in ["banana", "apple", "cherry"] {
        create_todo(&app, &token, title, false).await;
    }

    let (_, body) = app.get("/api/todos?sort=title&order=asc", &token).await;
    let titles: Vec<&str> = body["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|todo| todo["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["apple", "banana", "cherry"]);

    let (status, body) = app.get("/api/todos?sort=priority", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn unusable_query_and_path_values_get_json_errors() {
    let app = TestApp::new().await.unwrap();
    let (_, token) = app.login_as("alice@example.com").await.unwrap();

    for uri in ["/api/todos?order=up", "/api/todos?status=weird", "/api/todos/abc"] {
        let (status, body) = app.get(uri, &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "BAD_REQUEST", "{}", uri);
        assert!(body["message"].is_string(), "{}", uri);
    }

    let (status, body) = app.delete("/api/todos/abc", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn cannot_touch_another_users_todo() {
    let app = TestApp::new().await.unwrap();
    let (_, alice) = app.login_as("alice@example.com").await.unwrap();
    let (_, bob) = app.login_as("bob@example.com").await.unwrap();
    let id = create_todo(&app, &alice, "private", false).await;
    let uri = format!("/api/todos/{}", id);

    let (status, _) = app.get(&uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.put(&uri, &bob, json!({ "title": "mine now" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get(&uri, &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"]["title"], "private");
}

#[tokio::test]
async fn can_update_toggle_and_delete_a_todo() {
    let app = TestApp::new().await.unwrap();
    let (_, token) = app.login_as("alice@example.com").await.unwrap();
    let id = create_todo(&app, &token, "draft", false).await;
    let uri = format!("/api/todos/{}", id);

    let (status, body) = app
        .put(&uri, &token, json!({ "title": "final" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"]["title"], "final");
    assert_eq!(body["todo"]["description"], "something to do");

    let (status, body) = app
        .send("PATCH", &uri, Some(&token), Some(json!({ "completed": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"]["completed"], true);

    let (status, _) = app
        .send("PATCH", &uri, Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"]["id"], id);

    let (status, body) = app.get(&uri, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}
