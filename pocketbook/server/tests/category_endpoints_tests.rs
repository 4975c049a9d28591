use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::TestApp;

#[tokio::test]
async fn can_manage_categories() {
    let app = TestApp::new().await.unwrap();
    let (_, token) = app.login_as("alice@example.com").await.unwrap();

    let (status, body) = app
        .post("/api/expenses/category", &token, json!({ "name": "Food" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["category"]["name"], "Food");
    let uri = format!("/api/expenses/category/{}", body["category"]["id"]);

    let (status, body) = app
        .put(&uri, &token, json!({ "name": "Groceries" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["name"], "Groceries");

    let (status, body) = app.get("/api/expenses/category", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["categories"][0]["name"], "Groceries");

    let (status, _) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&uri, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_name_is_required() {
    let app = TestApp::new().await.unwrap();
    let (_, token) = app.login_as("alice@example.com").await.unwrap();

    let (status, body) = app
        .post("/api/expenses/category", &token, json!({ "name": "  " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please enter a category name");

    let (status, _) = app.post("/api/expenses/category", &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn categories_are_private_to_their_owner() {
    let app = TestApp::new().await.unwrap();
    let (_, alice) = app.login_as("alice@example.com").await.unwrap();
    let (_, bob) = app.login_as("bob@example.com").await.unwrap();
    let (_, body) = app
        .post("/api/expenses/category", &alice, json!({ "name": "Rent" }))
        .await;
    let uri = format!("/api/expenses/category/{}", body["category"]["id"]);

    let (_, body) = app.get("/api/expenses/category", &bob).await;
    assert_eq!(body["count"], 0);
    let (status, _) = app.get(&uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.put(&uri, &bob, json!({ "name": "Mine" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get(&uri, &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["name"], "Rent");
}
