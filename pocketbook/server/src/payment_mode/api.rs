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
use crate::payment_mode::{PaymentMode, PaymentModeService, PaymentModeServiceError};
use crate::web::AppState;
use crate::web::api::{ApiError, ApiJson, ApiPath, ErrorResponse};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentModeJson {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentMode> for PaymentModeJson {
    fn from(payment_mode: PaymentMode) -> Self {
        Self {
            id: payment_mode.id(),
            user_id: payment_mode.user_id(),
            name: payment_mode.name().to_string(),
            created_at: payment_mode.created_at(),
            updated_at: payment_mode.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentModesResponse {
    pub message: String,
    pub payment_modes: Vec<PaymentModeJson>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentModeResponse {
    pub message: String,
    pub payment_mode: PaymentModeJson,
}

impl PaymentModeResponse {
    fn new(message: &str, payment_mode: PaymentMode) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            payment_mode: PaymentModeJson::from(payment_mode),
        })
    }
}

/// Request body for creating or renaming a payment mode.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentModeRequest {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<PaymentModeServiceError> for ApiError {
    fn from(err: PaymentModeServiceError) -> Self {
        match err {
            PaymentModeServiceError::PaymentModeNotFound(_) => ApiError::NotFound(err.to_string()),
            PaymentModeServiceError::MissingName => ApiError::BadRequest(err.to_string()),
            PaymentModeServiceError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Handler for GET /api/expenses/paymentmode
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/expenses/paymentmode",
    responses(
        (status = 200, description = "Payment modes of the current user", body = PaymentModesResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse)
    ),
    tag = "Payment modes"
)]
pub async fn list_payment_modes_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<PaymentModesResponse>, ApiError> {
    let payment_modes: Vec<PaymentModeJson> = PaymentModeService::new(&state.db, user.id)
        .get_all_payment_modes()
        .await?
        .into_iter()
        .map(PaymentModeJson::from)
        .collect();
    let count = payment_modes.len();

    Ok(Json(PaymentModesResponse {
        message: "Successfully fetched the payment modes".to_string(),
        payment_modes,
        count,
    }))
}

/// Handler for POST /api/expenses/paymentmode
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/expenses/paymentmode",
    request_body = PaymentModeRequest,
    responses(
        (status = 201, description = "Payment mode created", body = PaymentModeResponse),
        (status = 400, description = "Name missing", body = ErrorResponse)
    ),
    tag = "Payment modes"
)]
pub async fn create_payment_mode_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<PaymentModeRequest>,
) -> Result<(StatusCode, Json<PaymentModeResponse>), ApiError> {
    let payment_mode = PaymentModeService::new(&state.db, user.id)
        .create_payment_mode(payload.name.as_deref().unwrap_or_default())
        .await?;
    Ok((
        StatusCode::CREATED,
        PaymentModeResponse::new("Successfully added the new payment mode", payment_mode),
    ))
}

/// Handler for GET /api/expenses/paymentmode/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/expenses/paymentmode/{id}",
    params(("id" = i32, Path, description = "Payment mode ID")),
    responses(
        (status = 200, description = "The payment mode", body = PaymentModeResponse),
        (status = 404, description = "No such payment mode for this user", body = ErrorResponse)
    ),
    tag = "Payment modes"
)]
pub async fn get_payment_mode_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<PaymentModeResponse>, ApiError> {
    let payment_mode = PaymentModeService::new(&state.db, user.id)
        .get_payment_mode_by_id(id)
        .await?;
    Ok(PaymentModeResponse::new(
        "Successfully fetched the payment mode",
        payment_mode,
    ))
}

/// Handler for PUT /api/expenses/paymentmode/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/expenses/paymentmode/{id}",
    params(("id" = i32, Path, description = "Payment mode ID")),
    request_body = PaymentModeRequest,
    responses(
        (status = 200, description = "Renamed payment mode", body = PaymentModeResponse),
        (status = 400, description = "Name missing", body = ErrorResponse),
        (status = 404, description = "No such payment mode for this user", body = ErrorResponse)
    ),
    tag = "Payment modes"
)]
pub async fn update_payment_mode_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<PaymentModeRequest>,
) -> Result<Json<PaymentModeResponse>, ApiError> {
    let payment_mode = PaymentModeService::new(&state.db, user.id)
        .rename_payment_mode(id, payload.name.as_deref().unwrap_or_default())
        .await?;
    Ok(PaymentModeResponse::new(
        "Successfully updated the payment mode",
        payment_mode,
    ))
}

/// Handler for DELETE /api/expenses/paymentmode/{id}
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/expenses/paymentmode/{id}",
    params(("id" = i32, Path, description = "Payment mode ID")),
    responses(
        (status = 200, description = "Deleted payment mode", body = PaymentModeResponse),
        (status = 404, description = "No such payment mode for this user", body = ErrorResponse)
    ),
    tag = "Payment modes"
)]
pub async fn delete_payment_mode_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<PaymentModeResponse>, ApiError> {
    let payment_mode = PaymentModeService::new(&state.db, user.id)
        .delete_payment_mode_by_id(id)
        .await?;
    Ok(PaymentModeResponse::new(
        "Successfully deleted the payment mode",
        payment_mode,
    ))
}

pub fn create_payment_mode_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/expenses/paymentmode",
            get(list_payment_modes_handler).post(create_payment_mode_handler),
        )
        .route(
            "/expenses/paymentmode/{id}",
            get(get_payment_mode_handler)
                .put(update_payment_mode_handler)
                .delete(delete_payment_mode_handler),
        )
        .with_state(state)
}
