use axum::{
    Router,
    extract::{Extension, State},
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::CurrentUser;
use crate::entities::sea_orm_active_enums::{ExpenseStatus, ExpenseType};
use crate::summary::{SummaryFilter, SummaryGroup, SummaryService, SummaryServiceError};
use crate::web::AppState;
use crate::web::api::{ApiError, ApiQuery, ErrorResponse};

/// One aggregated group of expenses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryGroupJson {
    /// Category ID
    pub category: i32,
    /// Payment mode ID
    pub payment_mode: i32,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub status: ExpenseStatus,
    pub month: u32,
    pub year: i32,
    pub total_amount: f64,
}

impl From<SummaryGroup> for SummaryGroupJson {
    fn from(group: SummaryGroup) -> Self {
        Self {
            category: group.category_id,
            payment_mode: group.payment_mode_id,
            expense_type: group.expense_type,
            status: group.status,
            month: group.month,
            year: group.year,
            total_amount: group.total_amount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub message: String,
    pub expense_summary: Vec<SummaryGroupJson>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Calendar month, 1 to 12
    pub month: Option<u32>,
    pub year: Option<i32>,
    /// Category ID
    pub category: Option<i32>,
    /// Payment mode ID
    pub payment_mode: Option<i32>,
}

impl From<SummaryQuery> for SummaryFilter {
    fn from(query: SummaryQuery) -> Self {
        Self {
            month: query.month,
            year: query.year,
            category_id: query.category,
            payment_mode_id: query.payment_mode,
        }
    }
}

impl From<SummaryServiceError> for ApiError {
    fn from(err: SummaryServiceError) -> Self {
        match err {
            SummaryServiceError::InvalidMonth(_) => ApiError::BadRequest(err.to_string()),
            SummaryServiceError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Handler for GET /api/expenses/summary
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/expenses/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Expense totals per group", body = SummaryResponse),
        (status = 400, description = "Month out of range", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Summary"
)]
pub async fn get_summary_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let expense_summary = SummaryService::new(&state.db, user.id)
        .summarize(query.into())
        .await?
        .into_iter()
        .map(SummaryGroupJson::from)
        .collect();

    Ok(Json(SummaryResponse {
        message: "Successfully summarized the expenses".to_string(),
        expense_summary,
    }))
}

pub fn create_summary_router(state: AppState) -> Router {
    Router::new()
        .route("/expenses/summary", get(get_summary_handler))
        .with_state(state)
}
