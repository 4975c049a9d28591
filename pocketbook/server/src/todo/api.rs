use axum::{
    Router,
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::CurrentUser;
use crate::query::SortOrder;
use crate::todo::{
    Todo, TodoChanges, TodoListFilter, TodoService, TodoServiceError, TodoSortKey,
    TodoStatusFilter,
};
use crate::web::AppState;
use crate::web::api::{ApiError, ApiJson, ApiPath, ApiQuery, ErrorResponse};

/// JSON representation of a Todo for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoJson {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for TodoJson {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id(),
            user_id: todo.user_id(),
            title: todo.title().to_string(),
            description: todo.description().to_string(),
            completed: todo.completed(),
            created_at: todo.created_at(),
            updated_at: todo.updated_at(),
        }
    }
}

/// API response for listing todos.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodosResponse {
    pub message: String,
    pub todos: Vec<TodoJson>,
    pub count: usize,
}

/// API response carrying a single todo.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoResponse {
    pub message: String,
    pub todo: TodoJson,
}

impl TodoResponse {
    fn new(message: &str, todo: Todo) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            todo: TodoJson::from(todo),
        })
    }
}

/// Request body for creating or updating a todo.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Request body for toggling completion.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompletedRequest {
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Query parameters for listing todos.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TodoListQuery {
    /// all | completed | pending
    #[serde(default)]
    pub status: TodoStatusFilter,
    /// created | updated | title
    #[serde(default)]
    pub sort: TodoSortKey,
    /// asc | desc
    #[serde(default)]
    pub order: SortOrder,
}

impl From<TodoServiceError> for ApiError {
    fn from(err: TodoServiceError) -> Self {
        match err {
            TodoServiceError::TodoNotFound(_) => ApiError::NotFound(err.to_string()),
            TodoServiceError::Validation(message) => ApiError::BadRequest(message),
            TodoServiceError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Handler for GET /api/todos
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/todos",
    params(TodoListQuery),
    responses(
        (status = 200, description = "Todos of the current user", body = TodosResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn list_todos_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<TodoListQuery>,
) -> Result<Json<TodosResponse>, ApiError> {
    let filter = TodoListFilter {
        status: query.status,
        sort: query.sort,
        order: query.order,
    };
    let todos: Vec<TodoJson> = TodoService::new(&state.db, user.id)
        .list_todos(filter)
        .await?
        .into_iter()
        .map(TodoJson::from)
        .collect();
    let count = todos.len();

    Ok(Json(TodosResponse {
        message: "Successfully fetched the todos".to_string(),
        todos,
        count,
    }))
}

/// Handler for POST /api/todos
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = TodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoResponse),
        (status = 400, description = "Title or description missing", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn create_todo_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<TodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    let todo = TodoService::new(&state.db, user.id)
        .create_todo(
            payload.title.as_deref().unwrap_or_default(),
            payload.description.as_deref().unwrap_or_default(),
            payload.completed.unwrap_or(false),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        TodoResponse::new("Successfully created the new todo", todo),
    ))
}

/// Handler for GET /api/todos/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "The todo", body = TodoResponse),
        (status = 404, description = "No such todo for this user", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn get_todo_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = TodoService::new(&state.db, user.id)
        .get_todo_by_id(id)
        .await?;
    Ok(TodoResponse::new("Successfully retrieved the todo", todo))
}

/// Handler for PUT /api/todos/{id} - updates the provided fields.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    request_body = TodoRequest,
    responses(
        (status = 200, description = "Updated todo", body = TodoResponse),
        (status = 400, description = "Empty title or description", body = ErrorResponse),
        (status = 404, description = "No such todo for this user", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn update_todo_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<TodoRequest>,
) -> Result<Json<TodoResponse>, ApiError> {
    let changes = TodoChanges {
        title: payload.title,
        description: payload.description,
        completed: payload.completed,
    };
    let todo = TodoService::new(&state.db, user.id)
        .update_todo(id, changes)
        .await?;
    Ok(TodoResponse::new("Successfully updated the todo", todo))
}

/// Handler for PATCH /api/todos/{id} - sets the completion flag.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    patch,
    path = "/api/todos/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    request_body = CompletedRequest,
    responses(
        (status = 200, description = "Updated todo", body = TodoResponse),
        (status = 400, description = "`completed` missing", body = ErrorResponse),
        (status = 404, description = "No such todo for this user", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn set_todo_completed_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CompletedRequest>,
) -> Result<Json<TodoResponse>, ApiError> {
    let completed = payload
        .completed
        .ok_or_else(|| ApiError::BadRequest("Please provide the completed flag".to_string()))?;
    let todo = TodoService::new(&state.db, user.id)
        .set_completed(id, completed)
        .await?;
    Ok(TodoResponse::new("Successfully updated the todo", todo))
}

/// Handler for DELETE /api/todos/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "Deleted todo", body = TodoResponse),
        (status = 404, description = "No such todo for this user", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn delete_todo_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = TodoService::new(&state.db, user.id)
        .delete_todo_by_id(id)
        .await?;
    Ok(TodoResponse::new("Successfully deleted the todo", todo))
}

/// Creates and returns the todos API router.
pub fn create_todo_router(state: AppState) -> Router {
    Router::new()
        .route("/todos", get(list_todos_handler).post(create_todo_handler))
        .route(
            "/todos/{id}",
            get(get_todo_handler)
                .put(update_todo_handler)
                .patch(set_todo_completed_handler)
                .delete(delete_todo_handler),
        )
        .with_state(state)
}
