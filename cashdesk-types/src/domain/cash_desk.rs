//! Cash desk domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number identifying a physical point-of-sale terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct CashDeskNumber(i64);

impl CashDeskNumber {
    pub fn new(number: i64) -> Self {
        Self(number)
    }

    /// Returns the raw number as stored in the database.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for CashDeskNumber {
    fn from(number: i64) -> Self {
        Self(number)
    }
}

impl std::fmt::Display for CashDeskNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CashDeskNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A cash desk. Its number is its whole identity; payments only refer to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashDesk {
    pub number: CashDeskNumber,
}

impl CashDesk {
    pub fn new(number: CashDeskNumber) -> Self {
        Self { number }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cash_desk_number() {
        let number: CashDeskNumber = " 12 ".parse().unwrap();
        assert_eq!(number.as_i64(), 12);
        assert!("twelve".parse::<CashDeskNumber>().is_err());
    }
}
