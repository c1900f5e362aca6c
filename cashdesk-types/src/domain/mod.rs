//! Domain models for the cash desk payment service.

pub mod cash_desk;
pub mod employee;
pub mod filter;
pub mod payment;
pub mod payment_item;

pub use cash_desk::{CashDesk, CashDeskNumber};
pub use employee::{Employee, EmployeeRole, RegistrationNumber};
pub use filter::PaymentFilter;
pub use payment::{NewPayment, Payment, PaymentDetail, PaymentId, PaymentType};
pub use payment_item::{NewPaymentItem, PaymentItem, PaymentItemId};
