//! Employee domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::payment::PaymentType;
use crate::error::DomainError;

/// Registration number of an employee.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RegistrationNumber(i64);

impl RegistrationNumber {
    pub fn new(number: i64) -> Self {
        Self(number)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RegistrationNumber {
    fn from(number: i64) -> Self {
        Self(number)
    }
}

impl std::fmt::Display for RegistrationNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of an employee, used for authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum EmployeeRole {
    Cashier,
    Manager,
}

impl EmployeeRole {
    /// Returns the role tag as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeRole::Cashier => "Cashier",
            EmployeeRole::Manager => "Manager",
        }
    }
}

impl std::fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmployeeRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cashier" => Ok(EmployeeRole::Cashier),
            "Manager" => Ok(EmployeeRole::Manager),
            other => Err(DomainError::ValidationError(format!(
                "Unknown employee role: {}",
                other
            ))),
        }
    }
}

/// An employee working at the cash desks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub registration_number: RegistrationNumber,
    pub first_name: String,
    pub last_name: String,
    pub role: EmployeeRole,
}

impl Employee {
    /// Creates a cashier.
    pub fn cashier(
        registration_number: RegistrationNumber,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            registration_number,
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: EmployeeRole::Cashier,
        }
    }

    /// Creates a manager.
    pub fn manager(
        registration_number: RegistrationNumber,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            registration_number,
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: EmployeeRole::Manager,
        }
    }

    /// Checks that this employee may create a payment of the given type.
    ///
    /// Credit card payments are reserved for managers.
    pub fn authorize(&self, payment_type: PaymentType) -> Result<(), DomainError> {
        if payment_type == PaymentType::CreditCard && self.role != EmployeeRole::Manager {
            return Err(DomainError::InsufficientRights);
        }
        Ok(())
    }
}
