//! # Cash Desk Types
//!
//! Domain types and port traits for the cash desk payment service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CashDesk, Employee, Payment, PaymentItem)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Commands, query parameters and responses for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CashDesk, CashDeskNumber, Employee, EmployeeRole, NewPayment, NewPaymentItem, Payment,
    PaymentDetail, PaymentFilter, PaymentId, PaymentItem, PaymentItemId, PaymentType,
    RegistrationNumber,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::PaymentRepository;
