use axum::{
    Router,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tower::ServiceBuilder;
use utoipa::{OpenApi, ToSchema};

use crate::auth;
use crate::web::AppState;

/// JSON response for API errors
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine readable error code
    pub error: String,
    /// Human readable description
    pub message: String,
}

/// JSON response carrying only a confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

const INTERNAL_ERROR_MESSAGE: &str =
    "An unexpected error occurred while processing your request. Please try again later.";

/// Error type shared by every JSON API handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field is missing or holds an unusable value.
    #[error("{0}")]
    BadRequest(String),
    /// The request carries no valid session, or the credentials are wrong.
    #[error("{0}")]
    Unauthorized(String),
    /// The resource does not exist for the current user.
    #[error("{0}")]
    NotFound(String),
    /// Anything else. The message is logged, never sent to the client.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if !matches!(self, ApiError::Internal(_)) {
            tracing::warn!("Request rejected: {}", self);
        }

        let (status, code, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections are reported as [`ApiError`] bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` extractor whose rejections are reported as [`ApiError`] bodies.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `Path` extractor whose rejections are reported as [`ApiError`] bodies.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(state: AppState) -> Router {
    let auth_routes = auth::api::create_auth_router(state.clone());
    let protected_routes = Router::new()
        .merge(auth::api::create_session_router(state.clone()))
        .merge(crate::todo::api::create_todo_router(state.clone()))
        .merge(crate::category::api::create_category_router(state.clone()))
        .merge(crate::payment_mode::api::create_payment_mode_router(
            state.clone(),
        ))
        .merge(crate::expense::api::create_expense_router(state.clone()))
        .merge(crate::summary::api::create_summary_router(state.clone()))
        .layer(ServiceBuilder::new().layer(from_fn(auth::require_auth_middleware)));

    Router::new()
        .nest("/api", auth_routes.merge(protected_routes))
        .layer(ServiceBuilder::new().layer(from_fn_with_state(
            state.auth.clone(),
            auth::auth_user_middleware,
        )))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::api::register_handler,
        auth::api::login_handler,
        auth::api::logout_handler,
        auth::api::current_user_handler,
        crate::todo::api::list_todos_handler,
        crate::todo::api::create_todo_handler,
        crate::todo::api::get_todo_handler,
        crate::todo::api::update_todo_handler,
        crate::todo::api::set_todo_completed_handler,
        crate::todo::api::delete_todo_handler,
        crate::category::api::list_categories_handler,
        crate::category::api::create_category_handler,
        crate::category::api::get_category_handler,
        crate::category::api::update_category_handler,
        crate::category::api::delete_category_handler,
        crate::payment_mode::api::list_payment_modes_handler,
        crate::payment_mode::api::create_payment_mode_handler,
        crate::payment_mode::api::get_payment_mode_handler,
        crate::payment_mode::api::update_payment_mode_handler,
        crate::payment_mode::api::delete_payment_mode_handler,
        crate::expense::api::list_expenses_handler,
        crate::expense::api::create_expense_handler,
        crate::expense::api::get_expense_handler,
        crate::expense::api::update_expense_handler,
        crate::expense::api::delete_expense_handler,
        crate::summary::api::get_summary_handler,
    ),
    tags(
        (name = "Auth", description = "Registration and sessions"),
        (name = "Todos", description = "Todo management"),
        (name = "Categories", description = "Expense categories"),
        (name = "Payment modes", description = "Expense payment modes"),
        (name = "Expenses", description = "Expense records"),
        (name = "Summary", description = "Expense aggregation"),
    )
)]
pub struct ApiDoc;
