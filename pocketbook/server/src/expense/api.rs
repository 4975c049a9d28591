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
use crate::entities::sea_orm_active_enums::{ExpenseStatus, ExpenseType};
use crate::expense::{
    ExpenseDetails, ExpenseInput, ExpenseListFilter, ExpenseService, ExpenseServiceError,
    ExpenseSortKey,
};
use crate::query::SortOrder;
use crate::web::AppState;
use crate::web::api::{ApiError, ApiJson, ApiPath, ApiQuery, ErrorResponse};

/// JSON representation of an Expense, with referenced names resolved.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseJson {
    pub id: i32,
    pub user_id: i32,
    pub amount: f64,
    pub description: String,
    pub category: i32,
    /// `null` once the category has been deleted.
    pub category_name: Option<String>,
    pub payment_mode: i32,
    /// `null` once the payment mode has been deleted.
    pub payment_mode_name: Option<String>,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub status: ExpenseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExpenseDetails> for ExpenseJson {
    fn from(details: ExpenseDetails) -> Self {
        let expense = details.expense;
        Self {
            id: expense.id(),
            user_id: expense.user_id(),
            amount: expense.amount(),
            description: expense.description().to_string(),
            category: expense.category_id(),
            category_name: details.category_name,
            payment_mode: expense.payment_mode_id(),
            payment_mode_name: details.payment_mode_name,
            expense_type: expense.expense_type(),
            status: expense.status(),
            created_at: expense.created_at(),
            updated_at: expense.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpensesResponse {
    pub message: String,
    pub expenses: Vec<ExpenseJson>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpenseResponse {
    pub message: String,
    pub expense: ExpenseJson,
}

impl ExpenseResponse {
    fn new(message: &str, details: ExpenseDetails) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            expense: ExpenseJson::from(details),
        })
    }
}

/// Request body for creating or replacing an expense.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Category ID
    #[serde(default)]
    pub category: Option<i32>,
    /// Payment mode ID
    #[serde(default)]
    pub payment_mode: Option<i32>,
    #[serde(default, rename = "type")]
    pub expense_type: Option<ExpenseType>,
    /// Defaults to `paid`.
    #[serde(default)]
    pub status: Option<ExpenseStatus>,
}

impl From<ExpenseRequest> for ExpenseInput {
    fn from(request: ExpenseRequest) -> Self {
        Self {
            amount: request.amount,
            description: request.description,
            category_id: request.category,
            payment_mode_id: request.payment_mode,
            expense_type: request.expense_type,
            status: request.status,
        }
    }
}

/// Query parameters for listing expenses.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseListQuery {
    /// Only expenses in this category
    pub category: Option<i32>,
    /// Only expenses paid with this payment mode
    pub payment_mode: Option<i32>,
    #[serde(rename = "type")]
    pub expense_type: Option<ExpenseType>,
    pub status: Option<ExpenseStatus>,
    /// createdAt | amount | description
    #[serde(default)]
    pub sort: ExpenseSortKey,
    /// asc | desc
    #[serde(default)]
    pub order: SortOrder,
}

impl From<ExpenseListQuery> for ExpenseListFilter {
    fn from(query: ExpenseListQuery) -> Self {
        Self {
            category_id: query.category,
            payment_mode_id: query.payment_mode,
            expense_type: query.expense_type,
            status: query.status,
            sort: query.sort,
            order: query.order,
        }
    }
}

impl From<ExpenseServiceError> for ApiError {
    fn from(err: ExpenseServiceError) -> Self {
        match err {
            ExpenseServiceError::ExpenseNotFound(_) => ApiError::NotFound(err.to_string()),
            ExpenseServiceError::Validation(message) => ApiError::BadRequest(message),
            ExpenseServiceError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Handler for GET /api/expenses/expense
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/expenses/expense",
    params(ExpenseListQuery),
    responses(
        (status = 200, description = "Expenses of the current user", body = ExpensesResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Expenses"
)]
pub async fn list_expenses_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<ExpenseListQuery>,
) -> Result<Json<ExpensesResponse>, ApiError> {
    let expenses: Vec<ExpenseJson> = ExpenseService::new(&state.db, user.id)
        .list_expenses(query.into())
        .await?
        .into_iter()
        .map(ExpenseJson::from)
        .collect();
    let count = expenses.len();

    Ok(Json(ExpensesResponse {
        message: "Successfully fetched the expenses".to_string(),
        expenses,
        count,
    }))
}

/// Handler for POST /api/expenses/expense
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/expenses/expense",
    request_body = ExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = ExpenseResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    ),
    tag = "Expenses"
)]
pub async fn create_expense_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<ExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let details = ExpenseService::new(&state.db, user.id)
        .create_expense(payload.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        ExpenseResponse::new("Successfully added the new expense", details),
    ))
}

/// Handler for GET /api/expenses/expense/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/expenses/expense/{id}",
    params(("id" = i32, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "The expense with category and payment mode names", body = ExpenseResponse),
        (status = 404, description = "No such expense for this user", body = ErrorResponse)
    ),
    tag = "Expenses"
)]
pub async fn get_expense_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let details = ExpenseService::new(&state.db, user.id)
        .get_expense_by_id(id)
        .await?;
    Ok(ExpenseResponse::new(
        "Successfully fetched the expense",
        details,
    ))
}

/// Handler for PUT /api/expenses/expense/{id} - replaces the whole expense.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/expenses/expense/{id}",
    params(("id" = i32, Path, description = "Expense ID")),
    request_body = ExpenseRequest,
    responses(
        (status = 200, description = "Updated expense", body = ExpenseResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 404, description = "No such expense for this user", body = ErrorResponse)
    ),
    tag = "Expenses"
)]
pub async fn update_expense_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<ExpenseRequest>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let details = ExpenseService::new(&state.db, user.id)
        .update_expense(id, payload.into())
        .await?;
    Ok(ExpenseResponse::new(
        "Successfully updated the expense",
        details,
    ))
}

/// Handler for DELETE /api/expenses/expense/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/expenses/expense/{id}",
    params(("id" = i32, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Deleted expense", body = ExpenseResponse),
        (status = 404, description = "No such expense for this user", body = ErrorResponse)
    ),
    tag = "Expenses"
)]
pub async fn delete_expense_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let details = ExpenseService::new(&state.db, user.id)
        .delete_expense_by_id(id)
        .await?;
    Ok(ExpenseResponse::new(
        "Successfully deleted the expense",
        details,
    ))
}

/// Creates and returns the expenses API router.
pub fn create_expense_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/expenses/expense",
            get(list_expenses_handler).post(create_expense_handler),
        )
        .route(
            "/expenses/expense/{id}",
            get(get_expense_handler)
                .put(update_expense_handler)
                .delete(delete_expense_handler),
        )
        .with_state(state)
}
