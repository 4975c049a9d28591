use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use insta::assert_yaml_snapshot;
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::TestApp;

async fn register(app: &TestApp, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    app.send(
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

#[tokio::test]
async fn can_register_a_new_user() {
    let app = TestApp::new().await.unwrap();

    let (status, body) = register(&app, "alice@example.com", "hunter22").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "You have registered successfully");
}

#[tokio::test]
async fn rejects_duplicate_email() {
    let app = TestApp::new().await.unwrap();
    register(&app, "alice@example.com", "hunter22").await;

    let (status, body) = register(&app, "alice@example.com", "other-password").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn rejects_registration_without_password() {
    let app = TestApp::new().await.unwrap();

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "alice@example.com" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_yaml_snapshot!(body, @r#"
    error: BAD_REQUEST
    message: Both email and password are required
    "#);
}

#[tokio::test]
async fn login_sets_session_cookie_usable_for_protected_routes() {
    let app = TestApp::new().await.unwrap();
    register(&app, "alice@example.com", "hunter22").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": "alice@example.com", "password": "hunter22" }).to_string(),
        ))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("auth_token="));
    assert!(set_cookie.contains("HttpOnly"));
    let session = set_cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/auth/users")
        .header("cookie", session)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["role"], "User");
    assert_eq!(body["data"]["username"].as_str().unwrap().len(), 7);
}

#[tokio::test]
async fn login_returns_bearer_token() {
    let app = TestApp::new().await.unwrap();
    register(&app, "alice@example.com", "hunter22").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "hunter22" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "alice@example.com");

    let token = body["token"].as_str().unwrap();
    let (status, _) = app.get("/api/todos", token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rejects_wrong_password() {
    let app = TestApp::new().await.unwrap();
    register(&app, "alice@example.com", "hunter22").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "wrong" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_yaml_snapshot!(body, @r#"
    error: UNAUTHORIZED
    message: Invalid email or password
    "#);
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = TestApp::new().await.unwrap();

    for uri in [
        "/api/todos",
        "/api/auth/users",
        "/api/expenses/category",
        "/api/expenses/paymentmode",
        "/api/expenses/expense",
        "/api/expenses/summary",
    ] {
        let (status, body) = app.send("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    let (status, body) = app.send("GET", "/api/todos", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_yaml_snapshot!(body, @r#"
    error: UNAUTHORIZED
    message: Authentication required to access this resource
    "#);
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let app = TestApp::new().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header("cookie", "auth_token=whatever")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("auth_token="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn health_check_is_public() {
    let app = TestApp::new().await.unwrap();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
