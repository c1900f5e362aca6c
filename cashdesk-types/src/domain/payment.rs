//! Payment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::cash_desk::CashDeskNumber;
use super::employee::RegistrationNumber;
use super::payment_item::PaymentItem;
use crate::error::DomainError;

/// Store-generated identifier of a Payment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PaymentId(i64);

impl PaymentId {
    /// Wraps an id produced by the store.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for PaymentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// The payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PaymentType {
    Cash,
    CreditCard,
}

impl PaymentType {
    /// Returns the tag as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "Cash",
            PaymentType::CreditCard => "CreditCard",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentType {
    type Err = DomainError;

    /// Parses a payment type tag, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("Cash") {
            Ok(PaymentType::Cash)
        } else if s.eq_ignore_ascii_case("CreditCard") {
            Ok(PaymentType::CreditCard)
        } else {
            Err(DomainError::ValidationError(format!(
                "Unknown payment type: {}",
                s
            )))
        }
    }
}

/// A payment session at a cash desk.
///
/// A payment is open while `confirmed_at` is `None`. Confirming it freezes the
/// payment and its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Store-generated identifier
    pub id: PaymentId,
    /// Cash desk the payment was opened at
    pub cash_desk_number: CashDeskNumber,
    /// Employee who opened the payment
    pub employee_registration_number: RegistrationNumber,
    /// Payment method
    pub payment_type: PaymentType,
    /// When the payment was opened
    pub created_at: DateTime<Utc>,
    /// When the payment was confirmed, `None` while open
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Reconstructs a payment from database fields.
    pub fn from_parts(
        id: PaymentId,
        cash_desk_number: CashDeskNumber,
        employee_registration_number: RegistrationNumber,
        payment_type: PaymentType,
        created_at: DateTime<Utc>,
        confirmed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            cash_desk_number,
            employee_registration_number,
            payment_type,
            created_at,
            confirmed_at,
        }
    }

    pub fn is_open(&self) -> bool {
        self.confirmed_at.is_none()
    }

    /// Fails with `AlreadyConfirmed` unless the payment is still open.
    pub fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DomainError::AlreadyConfirmed)
        }
    }

    /// Closes the payment.
    pub fn confirm(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.confirmed_at = Some(at);
        Ok(())
    }
}

/// A payment that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub cash_desk_number: CashDeskNumber,
    pub employee_registration_number: RegistrationNumber,
    pub payment_type: PaymentType,
    pub created_at: DateTime<Utc>,
}

impl NewPayment {
    /// A payment opened right now.
    pub fn now(
        cash_desk_number: CashDeskNumber,
        employee_registration_number: RegistrationNumber,
        payment_type: PaymentType,
    ) -> Self {
        Self {
            cash_desk_number,
            employee_registration_number,
            payment_type,
            created_at: Utc::now(),
        }
    }

    /// Turns the pending payment into a stored one with the given id.
    pub fn into_payment(self, id: PaymentId) -> Payment {
        Payment::from_parts(
            id,
            self.cash_desk_number,
            self.employee_registration_number,
            self.payment_type,
            self.created_at,
            None,
        )
    }
}

/// A payment together with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetail {
    pub payment: Payment,
    pub items: Vec<PaymentItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_payment() -> Payment {
        NewPayment::now(
            CashDeskNumber::new(1),
            RegistrationNumber::new(1001),
            PaymentType::Cash,
        )
        .into_payment(PaymentId::new(1))
    }

    #[test]
    fn test_new_payment_is_open() {
        let payment = open_payment();
        assert!(payment.is_open());
        assert!(payment.ensure_open().is_ok());
    }

    #[test]
    fn test_confirm_twice_fails() {
        let mut payment = open_payment();
        payment.confirm(Utc::now()).unwrap();
        assert!(!payment.is_open());

        let result = payment.confirm(Utc::now());
        assert!(matches!(result, Err(DomainError::AlreadyConfirmed)));
    }

    #[test]
    fn test_parse_payment_type() {
        assert_eq!("Cash".parse::<PaymentType>().unwrap(), PaymentType::Cash);
        assert_eq!(
            "creditcard".parse::<PaymentType>().unwrap(),
            PaymentType::CreditCard
        );
        assert!(matches!(
            "Cheque".parse::<PaymentType>(),
            Err(DomainError::ValidationError(_))
        ));
    }
}
