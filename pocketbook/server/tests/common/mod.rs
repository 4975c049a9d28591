#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use migration::MigratorTrait;
use pocketbook_server::auth::{AuthState, CurrentUser, encode_jwt};
use pocketbook_server::entities::sea_orm_active_enums::Role;
use pocketbook_server::entities::user;
use pocketbook_server::web::{AppState, create_app};
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Opens a fresh in-memory SQLite database with every migration applied.
pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // An in-memory database lives as long as its connection, so the pool holds exactly one.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_auth_state() -> AuthState {
    AuthState {
        jwt_secret: "test_secret".to_string(),
        session_max_age: chrono::Duration::days(30),
        cookie_secure: false,
    }
}

/// Inserts a user row directly, skipping password hashing.
pub async fn create_user(db: &DatabaseConnection, email: &str) -> anyhow::Result<CurrentUser> {
    let now = Utc::now();
    let created = user::ActiveModel {
        email: ActiveValue::Set(email.to_string()),
        password_hash: ActiveValue::Set("unused".to_string()),
        role: ActiveValue::Set(Role::User),
        username: ActiveValue::Set(email.chars().take(5).collect()),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(CurrentUser::new(created.id, created.email, created.role))
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        let db = setup_db().await?;
        let state = AppState {
            db: Arc::new(db),
            auth: Arc::new(test_auth_state()),
        };
        let router = create_app(state.clone());
        Ok(Self { state, router })
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    /// Creates a user and returns a bearer token for them.
    pub async fn login_as(&self, email: &str) -> anyhow::Result<(CurrentUser, String)> {
        let user = create_user(self.db(), email).await?;
        let token = encode_jwt(&user, &self.state.auth).await?;
        Ok((user, token))
    }

    /// Sends one request through the full application and parses the JSON body.
    /// An empty body is returned as `Value::Null`, a non-JSON body as a string.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(token), None).await
    }
}
