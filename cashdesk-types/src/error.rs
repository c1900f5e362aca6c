//! Error types for the cash desk payment service.

/// Domain-level errors (business rule violations).
///
/// The messages are stable; callers match on them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Open payment for cashdesk.")]
    OpenPaymentExists,

    #[error("Insufficient rights to create a credit card payment.")]
    InsufficientRights,

    #[error("Payment not found.")]
    PaymentNotFound,

    #[error("Payment already confirmed.")]
    AlreadyConfirmed,

    #[error("Payment has items.")]
    PaymentHasItems,

    #[error("Cash desk not found.")]
    CashDeskNotFound,

    #[error("Employee not found.")]
    EmployeeNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes. Each variant displays its bare message.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::OpenPaymentExists
            | DomainError::AlreadyConfirmed
            | DomainError::PaymentHasItems => AppError::Conflict(err.to_string()),
            DomainError::InsufficientRights => AppError::Forbidden(err.to_string()),
            DomainError::PaymentNotFound
            | DomainError::CashDeskNotFound
            | DomainError::EmployeeNotFound => AppError::NotFound(err.to_string()),
            DomainError::ValidationError(msg) => AppError::BadRequest(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::Conflict(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_message() {
        let err: AppError = RepoError::Domain(DomainError::OpenPaymentExists).into();
        assert_eq!(err, AppError::Conflict("Open payment for cashdesk.".into()));
        assert_eq!(err.to_string(), "Open payment for cashdesk.");
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            AppError::from(DomainError::InsufficientRights),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::PaymentNotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::ValidationError("x".into())),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(RepoError::Database("boom".into())),
            AppError::Internal(_)
        ));
    }
}
