//! Expense response types.

use bigdecimal::BigDecimal;
use jiff::Timestamp;
use serde::Serialize;

use crate::service::store::ExpenseRecord;

/// An expense as returned to its owner.
///
/// `amount` is serialized as a decimal string with two places.
#[must_use]
#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    pub id: i32,
    pub username: String,
    pub description: String,
    pub amount: BigDecimal,
    pub date: Timestamp,
}

impl From<ExpenseRecord> for Expense {
    fn from(record: ExpenseRecord) -> Self {
        Self {
            id: record.id,
            username: record.owner,
            description: record.description,
            amount: record.amount,
            date: record.occurred_at,
        }
    }
}
