use axum::{
    Router,
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::category::{Category, CategoryService, CategoryServiceError};
use crate::web::AppState;
use crate::web::api::{ApiError, ApiJson, ApiPath, ErrorResponse};

/// JSON representation of a Category for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryJson {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryJson {
    fn from(category: Category) -> Self {
        Self {
            id: category.id(),
            user_id: category.user_id(),
            name: category.name().to_string(),
            created_at: category.created_at(),
            updated_at: category.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoriesResponse {
    pub message: String,
    pub categories: Vec<CategoryJson>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub message: String,
    pub category: CategoryJson,
}

impl CategoryResponse {
    fn new(message: &str, category: Category) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            category: CategoryJson::from(category),
        })
    }
}

/// Request body for creating or renaming a category.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<CategoryServiceError> for ApiError {
    fn from(err: CategoryServiceError) -> Self {
        match err {
            CategoryServiceError::CategoryNotFound(_) => ApiError::NotFound(err.to_string()),
            CategoryServiceError::MissingName => ApiError::BadRequest(err.to_string()),
            CategoryServiceError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Handler for GET /api/expenses/category
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/expenses/category",
    responses(
        (status = 200, description = "Categories of the current user", body = CategoriesResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn list_categories_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories: Vec<CategoryJson> = CategoryService::new(&state.db, user.id)
        .get_all_categories()
        .await?
        .into_iter()
        .map(CategoryJson::from)
        .collect();
    let count = categories.len();

    Ok(Json(CategoriesResponse {
        message: "Successfully fetched the categories".to_string(),
        categories,
        count,
    }))
}

/// Handler for POST /api/expenses/category
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/expenses/category",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Name missing", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn create_category_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let category = CategoryService::new(&state.db, user.id)
        .create_category(payload.name.as_deref().unwrap_or_default())
        .await?;
    Ok((
        StatusCode::CREATED,
        CategoryResponse::new("Successfully added the new category", category),
    ))
}

/// Handler for GET /api/expenses/category/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/expenses/category/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "The category", body = CategoryResponse),
        (status = 404, description = "No such category for this user", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = CategoryService::new(&state.db, user.id)
        .get_category_by_id(id)
        .await?;
    Ok(CategoryResponse::new(
        "Successfully fetched the category",
        category,
    ))
}

/// Handler for PUT /api/expenses/category/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/expenses/category/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Renamed category", body = CategoryResponse),
        (status = 400, description = "Name missing", body = ErrorResponse),
        (status = 404, description = "No such category for this user", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn update_category_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = CategoryService::new(&state.db, user.id)
        .rename_category(id, payload.name.as_deref().unwrap_or_default())
        .await?;
    Ok(CategoryResponse::new(
        "Successfully updated the category",
        category,
    ))
}

/// Handler for DELETE /api/expenses/category/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/expenses/category/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted category", body = CategoryResponse),
        (status = 404, description = "No such category for this user", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn delete_category_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = CategoryService::new(&state.db, user.id)
        .delete_category_by_id(id)
        .await?;
    Ok(CategoryResponse::new(
        "Successfully deleted the category",
        category,
    ))
}

/// Creates and returns the categories API router.
pub fn create_category_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/expenses/category",
            get(list_categories_handler).post(create_category_handler),
        )
        .route(
            "/expenses/category/{id}",
            get(get_category_handler)
                .put(update_category_handler)
                .delete(delete_category_handler),
        )
        .with_state(state)
}
