//! Row types for SQLite and PostgreSQL. Either or both adapters may be compiled.

use sqlx::FromRow;

use cashdesk_types::{
    CashDesk, CashDeskNumber, DomainError, Employee, EmployeeRole, Payment, PaymentId,
    PaymentItem, PaymentItemId, PaymentType, RegistrationNumber, RepoError,
};

#[cfg(feature = "postgres")]
use chrono::{DateTime, Utc};
#[cfg(feature = "postgres")]
use rust_decimal::Decimal;

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Cash desk row from database.
#[derive(FromRow)]
pub struct DbCashDesk {
    pub number: i64,
}

/// Employee row from database.
#[derive(FromRow)]
pub struct DbEmployee {
    pub registration_number: i64,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

// Payment rows are per backend: SQLite keeps timestamps and prices as TEXT,
// PostgreSQL as TIMESTAMPTZ and NUMERIC. Both adapters may be compiled together.

/// Payment row from SQLite.
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqlitePaymentRow {
    pub id: i64,
    pub cash_desk_number: i64,
    pub employee_registration_number: i64,
    pub payment_type: String,
    pub created_at: String,
    pub confirmed_at: Option<String>,
}

/// Payment item row from SQLite.
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqlitePaymentItemRow {
    pub id: i64,
    pub payment_id: i64,
    pub article_name: String,
    pub amount: i32,
    pub price: String,
}

/// Payment row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgPaymentRow {
    pub id: i64,
    pub cash_desk_number: i64,
    pub employee_registration_number: i64,
    pub payment_type: String,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// Payment item row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgPaymentItemRow {
    pub id: i64,
    pub payment_id: i64,
    pub article_name: String,
    pub amount: i32,
    pub price: Decimal,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_payment_type(s: &str) -> Result<PaymentType, RepoError> {
    s.parse()
        .map_err(|_| RepoError::Database(format!("Unknown payment type: {}", s)))
}

pub fn parse_role(s: &str) -> Result<EmployeeRole, RepoError> {
    s.parse()
        .map_err(|_| RepoError::Database(format!("Unknown employee role: {}", s)))
}

/// Timestamps are stored as fixed-width RFC 3339 text in SQLite, so that
/// string order equals chronological order.
#[cfg(feature = "sqlite")]
pub fn format_timestamp(dt: chrono::DateTime<chrono::Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(feature = "sqlite")]
pub fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}

/// Maps a failed write, translating constraint violations into domain errors.
///
/// A unique violation on `payments` can only come from the one-open-payment
/// index; a foreign key violation on delete means items still reference it.
pub fn map_write_error(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DomainError::OpenPaymentExists.into();
        }
        if db_err.is_foreign_key_violation() {
            return DomainError::PaymentHasItems.into();
        }
    }
    RepoError::Database(err.to_string())
}

/// Maps a failed master data insert.
pub fn map_insert_error(err: sqlx::Error, what: &str) -> RepoError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepoError::Conflict(format!("{} already exists", what));
        }
    }
    RepoError::Database(err.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion (feature-gated implementations)
// ─────────────────────────────────────────────────────────────────────────────

impl DbCashDesk {
    pub fn into_domain(self) -> CashDesk {
        CashDesk::new(CashDeskNumber::new(self.number))
    }
}

impl DbEmployee {
    /// Convert database row to domain Employee.
    pub fn into_domain(self) -> Result<Employee, RepoError> {
        Ok(Employee {
            registration_number: RegistrationNumber::new(self.registration_number),
            first_name: self.first_name,
            last_name: self.last_name,
            role: parse_role(&self.role)?,
        })
    }
}

fn payment_from_parts(
    id: i64,
    cash_desk_number: i64,
    employee_registration_number: i64,
    payment_type: &str,
    created_at: chrono::DateTime<chrono::Utc>,
    confirmed_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<Payment, RepoError> {
    Ok(Payment::from_parts(
        PaymentId::new(id),
        CashDeskNumber::new(cash_desk_number),
        RegistrationNumber::new(employee_registration_number),
        parse_payment_type(payment_type)?,
        created_at,
        confirmed_at,
    ))
}

#[cfg(feature = "sqlite")]
impl SqlitePaymentRow {
    /// Convert database row to domain Payment.
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        let confirmed_at = self
            .confirmed_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        payment_from_parts(
            self.id,
            self.cash_desk_number,
            self.employee_registration_number,
            &self.payment_type,
            parse_timestamp(&self.created_at)?,
            confirmed_at,
        )
    }
}

#[cfg(feature = "sqlite")]
impl SqlitePaymentItemRow {
    /// Convert database row to domain PaymentItem.
    pub fn into_domain(self) -> Result<PaymentItem, RepoError> {
        let price = self
            .price
            .parse::<rust_decimal::Decimal>()
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(PaymentItem {
            id: PaymentItemId::new(self.id),
            payment_id: PaymentId::new(self.payment_id),
            article_name: self.article_name,
            amount: self.amount,
            price,
        })
    }
}

#[cfg(feature = "postgres")]
impl PgPaymentRow {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        payment_from_parts(
            self.id,
            self.cash_desk_number,
            self.employee_registration_number,
            &self.payment_type,
            self.created_at,
            self.confirmed_at,
        )
    }
}

#[cfg(feature = "postgres")]
impl PgPaymentItemRow {
    pub fn into_domain(self) -> Result<PaymentItem, RepoError> {
        Ok(PaymentItem {
            id: PaymentItemId::new(self.id),
            payment_id: PaymentId::new(self.payment_id),
            article_name: self.article_name,
            amount: self.amount,
            price: self.price,
        })
    }
}
