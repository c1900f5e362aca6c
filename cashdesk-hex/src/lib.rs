//! # Cash Desk Hex
//!
//! Application service layer and HTTP adapter for the cash desk payment service.
//!
//! ## Architecture
//!
//! - `service/` - Payment lifecycle service (orchestrates domain operations)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served under `/swagger-ui`
//!
//! The service is generic over `R: PaymentRepository`, allowing
//! different repository implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::PaymentService;
