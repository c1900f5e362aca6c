//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use cashdesk_types::{
    AppError, DeletePaymentQuery, ListPaymentsQuery, NewPaymentCommand, NewPaymentItemCommand,
    PaymentDetailDto, PaymentDto, PaymentId, PaymentItemDto, PaymentRepository,
};

use crate::PaymentService;

/// Application state shared across handlers.
pub struct AppState<R: PaymentRepository> {
    pub service: PaymentService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_payment_id(id: &str) -> Result<PaymentId, ApiError> {
    id.parse()
        .map_err(|_| AppError::BadRequest("Invalid payment ID".into()).into())
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// List payments, optionally filtered by cash desk and start date.
#[tracing::instrument(skip(state))]
pub async fn list_payments<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state.service.list_payments(query.into()).await?;
    let response: Vec<PaymentDto> = payments.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// Get a payment with its items.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn get_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;

    let detail = state.service.get_payment(payment_id).await?;
    Ok(Json(PaymentDetailDto::from(detail)))
}

/// Open a payment at a cash desk.
#[tracing::instrument(skip(state), fields(cash_desk = %cmd.cash_desk_number))]
pub async fn open_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(cmd): Json<NewPaymentCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.service.open_payment(cmd).await?;
    Ok((StatusCode::CREATED, Json(PaymentDto::from(payment))))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn confirm_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;

    state.service.confirm_payment(payment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a payment. Items are removed too when `deleteItems=true`.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn delete_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Query(query): Query<DeletePaymentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;

    state
        .service
        .delete_payment(payment_id, query.delete_items)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a line item to an open payment.
#[tracing::instrument(skip(state), fields(payment_id = %cmd.payment_id))]
pub async fn add_payment_item<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(cmd): Json<NewPaymentItemCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.service.add_payment_item(cmd).await?;
    Ok((StatusCode::CREATED, Json(PaymentItemDto::from(item))))
}
