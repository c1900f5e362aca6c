//! OpenAPI document for the payments API.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use cashdesk_types::domain::PaymentType;
use cashdesk_types::dto::{
    DeletePaymentQuery, ListPaymentsQuery, NewPaymentCommand, NewPaymentItemCommand,
    PaymentDetailDto, PaymentDto, PaymentItemDto,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// List payments
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "payments",
    params(ListPaymentsQuery),
    responses(
        (status = 200, description = "Payments ordered by id", body = Vec<PaymentDto>)
    )
)]
async fn list_payments() {}

/// Get a payment with its items
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "payments",
    params(
        ("id" = i64, Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Payment details", body = PaymentDetailDto),
        (status = 404, description = "Payment not found")
    )
)]
async fn get_payment() {}

/// Open a payment at a cash desk
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "payments",
    request_body = NewPaymentCommand,
    responses(
        (status = 201, description = "Payment opened", body = PaymentDto),
        (status = 400, description = "Unknown payment type"),
        (status = 403, description = "Employee may not create this payment type"),
        (status = 404, description = "Cash desk or employee not found"),
        (status = 409, description = "Cash desk already has an open payment")
    )
)]
async fn open_payment() {}

/// Confirm (close) an open payment
#[utoipa::path(
    put,
    path = "/api/payments/{id}/confirm",
    tag = "payments",
    params(
        ("id" = i64, Path, description = "Payment ID")
    ),
    responses(
        (status = 204, description = "Payment confirmed"),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment already confirmed")
    )
)]
async fn confirm_payment() {}

/// Delete a payment
#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    tag = "payments",
    params(
        ("id" = i64, Path, description = "Payment ID"),
        DeletePaymentQuery
    ),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment has items and deleteItems is false")
    )
)]
async fn delete_payment() {}

/// Add a line item to an open payment
#[utoipa::path(
    post,
    path = "/api/paymentItems",
    tag = "payment items",
    request_body = NewPaymentItemCommand,
    responses(
        (status = 201, description = "Item added", body = PaymentItemDto),
        (status = 400, description = "Invalid item"),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment already confirmed")
    )
)]
async fn add_payment_item() {}

/// OpenAPI documentation for the Cash Desk Payments API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cash Desk Payments API",
        version = "1.0.0",
        description = "Point-of-sale payment lifecycle: open a payment at a cash desk, add items, confirm or delete it.\n\nA cash desk has at most one open payment at a time. Credit card payments can only be opened by managers.",
        license(name = "MIT"),
    ),
    paths(
        health,
        list_payments,
        get_payment,
        open_payment,
        confirm_payment,
        delete_payment,
        add_payment_item,
    ),
    components(
        schemas(
            NewPaymentCommand,
            NewPaymentItemCommand,
            PaymentDto,
            PaymentItemDto,
            PaymentDetailDto,
            PaymentType,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "Payment lifecycle operations"),
        (name = "payment items", description = "Line items of open payments"),
    )
)]
pub struct ApiDoc;
