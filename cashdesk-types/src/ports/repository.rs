//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, InMemory) will implement this trait.

use chrono::{DateTime, Utc};

use crate::domain::{
    CashDesk, CashDeskNumber, Employee, NewPayment, NewPaymentItem, Payment, PaymentFilter,
    PaymentId, PaymentItem, RegistrationNumber,
};
use crate::error::RepoError;

/// The main repository port for payment operations.
///
/// Every state-changing operation MUST check its preconditions and write in
/// one database transaction, applying the rules on the domain types.
#[async_trait::async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Master data
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a cash desk.
    async fn insert_cash_desk(&self, number: CashDeskNumber) -> Result<CashDesk, RepoError>;

    /// Registers an employee.
    async fn insert_employee(&self, employee: Employee) -> Result<Employee, RepoError>;

    /// Looks up a cash desk by number.
    async fn get_cash_desk(&self, number: CashDeskNumber) -> Result<Option<CashDesk>, RepoError>;

    /// Looks up an employee by registration number.
    async fn get_employee(
        &self,
        registration_number: RegistrationNumber,
    ) -> Result<Option<Employee>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment lifecycle (MUST be atomic)
    // ─────────────────────────────────────────────────────────────────────────────

    /// Opens a payment.
    ///
    /// Fails with `CashDeskNotFound`, `OpenPaymentExists`, `EmployeeNotFound`
    /// or `InsufficientRights`, checked in that order.
    async fn open_payment(&self, payment: NewPayment) -> Result<Payment, RepoError>;

    /// Confirms an open payment.
    async fn confirm_payment(&self, id: PaymentId, at: DateTime<Utc>) -> Result<(), RepoError>;

    /// Adds an item to an open payment.
    async fn add_payment_item(&self, item: NewPaymentItem) -> Result<PaymentItem, RepoError>;

    /// Deletes a payment, and its items when `delete_items` is set.
    ///
    /// Without `delete_items` a payment that still owns items is rejected with
    /// `PaymentHasItems`.
    async fn delete_payment(&self, id: PaymentId, delete_items: bool) -> Result<(), RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a payment by id.
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Lists the items of a payment, ascending by id.
    async fn list_payment_items(&self, id: PaymentId) -> Result<Vec<PaymentItem>, RepoError>;

    /// Lists payments matching the filter, ascending by id.
    async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, RepoError>;
}
