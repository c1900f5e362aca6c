//! Payment item domain model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::payment::PaymentId;
use crate::error::DomainError;

/// Store-generated identifier of a PaymentItem.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PaymentItemId(i64);

impl PaymentItemId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PaymentItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentItem {
    pub id: PaymentItemId,
    pub payment_id: PaymentId,
    pub article_name: String,
    /// Quantity, always positive
    pub amount: i32,
    /// Unit price
    pub price: Decimal,
}

/// A payment item that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentItem {
    pub payment_id: PaymentId,
    pub article_name: String,
    pub amount: i32,
    pub price: Decimal,
}

impl NewPaymentItem {
    /// Creates a validated payment item.
    ///
    /// # Validation
    /// - Article name cannot be blank
    /// - Amount must be positive
    /// - Price cannot be negative
    pub fn new(
        payment_id: PaymentId,
        article_name: String,
        amount: i32,
        price: Decimal,
    ) -> Result<Self, DomainError> {
        if article_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Article name cannot be empty".into(),
            ));
        }
        if amount <= 0 {
            return Err(DomainError::ValidationError(
                "Amount must be positive".into(),
            ));
        }
        if price.is_sign_negative() {
            return Err(DomainError::ValidationError(
                "Price cannot be negative".into(),
            ));
        }

        Ok(Self {
            payment_id,
            article_name,
            amount,
            price,
        })
    }

    pub fn into_item(self, id: PaymentItemId) -> PaymentItem {
        PaymentItem {
            id,
            payment_id: self.payment_id,
            article_name: self.article_name,
            amount: self.amount,
            price: self.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_valid_item() {
        let item = NewPaymentItem::new(
            PaymentId::new(1),
            "Cola".to_string(),
            2,
            Decimal::from_str("2.50").unwrap(),
        )
        .unwrap();
        assert_eq!(item.amount, 2);
        assert_eq!(item.price.to_string(), "2.50");
    }

    #[test]
    fn test_blank_article_name_fails() {
        let result = NewPaymentItem::new(PaymentId::new(1), "  ".to_string(), 1, Decimal::ONE);
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_non_positive_amount_fails() {
        let result = NewPaymentItem::new(PaymentId::new(1), "Cola".to_string(), 0, Decimal::ONE);
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_negative_price_fails() {
        let result = NewPaymentItem::new(
            PaymentId::new(1),
            "Cola".to_string(),
            1,
            Decimal::NEGATIVE_ONE,
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }
}
