//! Payment Application Service
//!
//! Orchestrates the payment lifecycle through the repository port.
//! Contains NO infrastructure logic - pure business orchestration.

use chrono::Utc;

use cashdesk_types::{
    AppError, DomainError, NewPayment, NewPaymentCommand, NewPaymentItem, NewPaymentItemCommand,
    Payment, PaymentDetail, PaymentFilter, PaymentId, PaymentItem, PaymentRepository, PaymentType,
};

/// Application service for the payment lifecycle.
///
/// Generic over `R: PaymentRepository` - the adapter is injected at compile time.
/// Every state-changing operation is a single repository call, so the
/// precondition checks and the write commit (or roll back) together.
pub struct PaymentService<R: PaymentRepository> {
    repo: R,
}

impl<R: PaymentRepository> PaymentService<R> {
    /// Creates a new payment service with the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    /// Opens a payment at a cash desk.
    ///
    /// The creation time is always the server clock; the client timestamp in
    /// the command is ignored.
    #[tracing::instrument(skip(self), fields(cash_desk = %cmd.cash_desk_number))]
    pub async fn open_payment(&self, cmd: NewPaymentCommand) -> Result<Payment, AppError> {
        let payment_type: PaymentType = cmd.payment_type_text.parse()?;

        let payment = self
            .repo
            .open_payment(NewPayment::now(
                cmd.cash_desk_number,
                cmd.employee_registration_number,
                payment_type,
            ))
            .await
            .inspect_err(|e| tracing::warn!("Open payment rejected: {}", e))?;

        tracing::info!(payment_id = %payment.id, "Payment opened");
        Ok(payment)
    }

    /// Confirms (closes) an open payment.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_payment(&self, id: PaymentId) -> Result<(), AppError> {
        self.repo
            .confirm_payment(id, Utc::now())
            .await
            .inspect_err(|e| tracing::warn!("Confirm rejected: {}", e))?;

        tracing::info!("Payment confirmed");
        Ok(())
    }

    /// Adds a line item to an open payment.
    #[tracing::instrument(skip(self), fields(payment_id = %cmd.payment_id))]
    pub async fn add_payment_item(
        &self,
        cmd: NewPaymentItemCommand,
    ) -> Result<PaymentItem, AppError> {
        let item = NewPaymentItem::new(cmd.payment_id, cmd.article_name, cmd.amount, cmd.price)?;

        let item = self
            .repo
            .add_payment_item(item)
            .await
            .inspect_err(|e| tracing::warn!("Add item rejected: {}", e))?;

        tracing::info!(item_id = %item.id, "Payment item added");
        Ok(item)
    }

    /// Deletes a payment, optionally together with its items.
    #[tracing::instrument(skip(self))]
    pub async fn delete_payment(&self, id: PaymentId, delete_items: bool) -> Result<(), AppError> {
        self.repo
            .delete_payment(id, delete_items)
            .await
            .inspect_err(|e| tracing::warn!("Delete rejected: {}", e))?;

        tracing::info!("Payment deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists payments matching the filter, ordered by id.
    #[tracing::instrument(skip(self))]
    pub async fn list_payments(&self, filter: PaymentFilter) -> Result<Vec<Payment>, AppError> {
        let payments = self.repo.list_payments(&filter).await?;
        tracing::debug!(count = payments.len(), "Listed payments");
        Ok(payments)
    }

    /// Gets a payment with its items.
    #[tracing::instrument(skip(self))]
    pub async fn get_payment(&self, id: PaymentId) -> Result<PaymentDetail, AppError> {
        let payment = self
            .repo
            .get_payment(id)
            .await?
            .ok_or(DomainError::PaymentNotFound)?;
        let items = self.repo.list_payment_items(id).await?;

        Ok(PaymentDetail { payment, items })
    }
}
