//! Filter for payment listings.

use chrono::{DateTime, NaiveDate, Utc};

use super::cash_desk::CashDeskNumber;
use super::payment::Payment;

/// Optional restrictions applied when listing payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    /// Only payments opened at this cash desk
    pub cash_desk_number: Option<CashDeskNumber>,
    /// Only payments created on or after this day (UTC)
    pub date_from: Option<NaiveDate>,
}

impl PaymentFilter {
    pub fn cash_desk(mut self, number: CashDeskNumber) -> Self {
        self.cash_desk_number = Some(number);
        self
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    /// Start of the `date_from` day as a timestamp.
    pub fn created_from(&self) -> Option<DateTime<Utc>> {
        self.date_from
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// Whether a payment passes the filter.
    pub fn matches(&self, payment: &Payment) -> bool {
        if let Some(number) = self.cash_desk_number {
            if payment.cash_desk_number != number {
                return false;
            }
        }
        match self.date_from {
            Some(date) => payment.created_at.date_naive() >= date,
            None => true,
        }
    }
}
