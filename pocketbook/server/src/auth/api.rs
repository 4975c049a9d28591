use axum::{
    Router,
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{CurrentUser, encode_jwt};
use crate::entities::sea_orm_active_enums::Role;
use crate::user::{User, UserService, UserServiceError};
use crate::web::AppState;
use crate::web::api::{ApiError, ApiJson, ErrorResponse, MessageResponse};

/// Credentials payload used by both registration and login.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    fn into_parts(self) -> (String, String) {
        (
            self.email.unwrap_or_default(),
            self.password.unwrap_or_default(),
        )
    }
}

/// JSON representation of a user profile.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserJson {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserJson {
    fn from(user: User) -> Self {
        Self {
            id: user.id(),
            email: user.email().to_string(),
            username: user.username().to_string(),
            role: user.role(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// JSON response for a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserJson,
}

/// JSON response wrapping the current user's profile.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub message: String,
    pub data: UserJson,
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::MissingCredentials | UserServiceError::EmailTaken(_) => {
                ApiError::BadRequest(err.to_string())
            }
            UserServiceError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            UserServiceError::UserNotFound(_) => ApiError::NotFound(err.to_string()),
            UserServiceError::PasswordHash(_) | UserServiceError::Database(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

/// Handler for POST /api/auth/register
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Missing credentials or email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let (email, password) = payload.into_parts();
    UserService::new(&state.db).register(&email, &password).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("You have registered successfully")),
    ))
}

/// Handler for POST /api/auth/login - verifies credentials and starts a session.
/// The JWT is returned in the body and also set as the session cookie.
#[tracing::instrument(skip(state, jar, payload))]
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let (email, password) = payload.into_parts();
    let user = UserService::new(&state.db)
        .authenticate(&email, &password)
        .await?;

    let current_user = CurrentUser::new(user.id(), user.email().to_string(), user.role());
    let token = encode_jwt(&current_user, &state.auth)
        .await
        .map_err(|err| ApiError::Internal(format!("Failed to issue session token: {}", err)))?;

    let jar = jar.add(state.auth.session_cookie(token.clone()));
    Ok((
        jar,
        Json(LoginResponse {
            message: "Logged in successfully".to_string(),
            token,
            user: UserJson::from(user),
        }),
    ))
}

/// Handler for POST /api/auth/logout - drops the session cookie.
#[tracing::instrument(skip(state, jar))]
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.remove(state.auth.expired_cookie()),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// Handler for GET /api/auth/users - returns the profile of the session user.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/auth/users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn current_user_handler(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserService::new(&state.db)
        .get_user_by_id(current_user.id)
        .await?;
    Ok(Json(UserResponse {
        message: "Successfully fetched the user details".to_string(),
        data: UserJson::from(user),
    }))
}

/// Creates the public authentication router.
pub fn create_auth_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .with_state(state)
}

/// Creates the router for session-bound auth endpoints. Must sit behind the auth middlewares.
pub fn create_session_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/users", get(current_user_handler))
        .with_state(state)
}
