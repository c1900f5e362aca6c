//! Data Transfer Objects (DTOs) for commands, queries and responses.
//!
//! Field names follow the camelCase wire format of the HTTP API.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CashDeskNumber, Payment, PaymentDetail, PaymentFilter, PaymentId, PaymentItem, PaymentItemId,
    PaymentType, RegistrationNumber,
};

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Command to open a payment at a cash desk.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentCommand {
    #[schema(value_type = i64, example = 1)]
    pub cash_desk_number: CashDeskNumber,
    /// Client-side timestamp. The server records its own clock as creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date_time: Option<DateTime<Utc>>,
    /// `Cash` or `CreditCard`
    #[serde(rename = "paymentType")]
    #[schema(example = "Cash")]
    pub payment_type_text: String,
    #[schema(value_type = i64, example = 1001)]
    pub employee_registration_number: RegistrationNumber,
}

/// Command to add a line item to an open payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentItemCommand {
    #[schema(example = "Cola")]
    pub article_name: String,
    /// Quantity
    #[schema(example = 2)]
    pub amount: i32,
    /// Unit price
    #[schema(value_type = String, example = "2.50")]
    pub price: Decimal,
    #[schema(value_type = i64, example = 1)]
    pub payment_id: PaymentId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Query parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Query string of the payment listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPaymentsQuery {
    /// Only payments of this cash desk
    pub cash_desk: Option<i64>,
    /// Only payments created on or after this date (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2024-05-13")]
    pub date_from: Option<NaiveDate>,
}

impl From<ListPaymentsQuery> for PaymentFilter {
    fn from(query: ListPaymentsQuery) -> Self {
        PaymentFilter {
            cash_desk_number: query.cash_desk.map(CashDeskNumber::new),
            date_from: query.date_from,
        }
    }
}

/// Query string of the payment deletion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DeletePaymentQuery {
    /// Also delete the items of the payment
    #[serde(default)]
    pub delete_items: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

/// A payment as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    #[schema(value_type = i64)]
    pub id: PaymentId,
    #[schema(value_type = i64)]
    pub cash_desk_number: CashDeskNumber,
    pub payment_date_time: DateTime<Utc>,
    /// Confirmation time, absent while the payment is open
    pub confirmed: Option<DateTime<Utc>>,
    pub payment_type: PaymentType,
    #[schema(value_type = i64)]
    pub employee_registration_number: RegistrationNumber,
}

impl From<Payment> for PaymentDto {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            cash_desk_number: payment.cash_desk_number,
            payment_date_time: payment.created_at,
            confirmed: payment.confirmed_at,
            payment_type: payment.payment_type,
            employee_registration_number: payment.employee_registration_number,
        }
    }
}

/// A payment item as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentItemDto {
    #[schema(value_type = i64)]
    pub id: PaymentItemId,
    pub article_name: String,
    pub amount: i32,
    #[schema(value_type = String, example = "2.50")]
    pub price: Decimal,
    #[schema(value_type = i64)]
    pub payment_id: PaymentId,
}

impl From<PaymentItem> for PaymentItemDto {
    fn from(item: PaymentItem) -> Self {
        Self {
            id: item.id,
            article_name: item.article_name,
            amount: item.amount,
            price: item.price,
            payment_id: item.payment_id,
        }
    }
}

/// A payment with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailDto {
    #[serde(flatten)]
    pub payment: PaymentDto,
    pub items: Vec<PaymentItemDto>,
}

impl From<PaymentDetail> for PaymentDetailDto {
    fn from(detail: PaymentDetail) -> Self {
        Self {
            payment: detail.payment.into(),
            items: detail.items.into_iter().map(Into::into).collect(),
        }
    }
}
