//! Owner-scoped expense records.
//!
//! The owner argument of every operation is the username verified by the
//! session gate. Callers never take it from request payloads.

use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use jiff::Timestamp;

use super::store::{ExpenseBackend, ExpenseChanges, ExpenseRecord, NewExpenseRecord, StoreError};
use crate::utility::tracing_targets::TRACING_TARGET_EXPENSES as TRACING_TARGET;

/// Exclusive upper bound on the magnitude of an amount: `NUMERIC(10, 2)`
/// leaves eight integer digits.
const AMOUNT_LIMIT: i64 = 100_000_000;

/// Integer digits that fit `NUMERIC(10, 2)`.
const MAX_INTEGER_DIGITS: i64 = 8;

/// Decimal places accepted before rounding to cents.
const MAX_INPUT_SCALE: i64 = 20;

/// Failures of [`ExpenseStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// The amount does not fit the storage precision, or carries more
    /// decimal places than are accepted.
    #[error("amount must be less than 100000000 in magnitude with at most 20 decimal places")]
    AmountOutOfRange,
    /// Storage failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Input for a new expense.
#[derive(Debug, Clone)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: BigDecimal,
    /// `None` stamps the current time.
    pub occurred_at: Option<Timestamp>,
}

/// Expense store over an [`ExpenseBackend`].
///
/// Updates and deletes that match no record owned by the caller succeed
/// without effect; the returned flag tells whether anything matched.
#[derive(Clone)]
pub struct ExpenseStore {
    backend: Arc<dyn ExpenseBackend>,
}

impl ExpenseStore {
    /// Creates a new store using the given backend.
    pub fn new(backend: Arc<dyn ExpenseBackend>) -> Self {
        Self { backend }
    }

    /// Creates a record owned by `owner`.
    pub async fn create(
        &self,
        owner: &str,
        draft: ExpenseDraft,
    ) -> Result<ExpenseRecord, ExpenseError> {
        let record = NewExpenseRecord {
            description: draft.description,
            amount: normalize_amount(draft.amount)?,
            occurred_at: draft.occurred_at.unwrap_or_else(Timestamp::now),
        };

        let record = self.backend.insert_expense(owner, record).await?;

        tracing::info!(
            target: TRACING_TARGET,
            expense_id = record.id,
            owner = %owner,
            "Expense created"
        );

        Ok(record)
    }

    /// Lists the records owned by `owner`. Empty when there are none.
    pub async fn list(&self, owner: &str) -> Result<Vec<ExpenseRecord>, ExpenseError> {
        Ok(self.backend.list_expenses(owner).await?)
    }

    /// Replaces the fields of record `id` if `owner` owns it.
    ///
    /// Returns whether a record matched.
    pub async fn update(
        &self,
        owner: &str,
        id: i32,
        description: String,
        amount: BigDecimal,
        occurred_at: Option<Timestamp>,
    ) -> Result<bool, ExpenseError> {
        let changes = ExpenseChanges {
            description,
            amount: normalize_amount(amount)?,
            occurred_at,
        };

        let matched = self.backend.update_expense(owner, id, changes).await?;
        tracing::info!(
            target: TRACING_TARGET,
            expense_id = id,
            owner = %owner,
            matched,
            "Expense update"
        );

        Ok(matched)
    }

    /// Deletes record `id` if `owner` owns it.
    ///
    /// Returns whether a record matched. Repeating a delete is harmless.
    pub async fn delete(&self, owner: &str, id: i32) -> Result<bool, ExpenseError> {
        let matched = self.backend.delete_expense(owner, id).await?;
        tracing::info!(
            target: TRACING_TARGET,
            expense_id = id,
            owner = %owner,
            matched,
            "Expense delete"
        );

        Ok(matched)
    }
}

impl std::fmt::Debug for ExpenseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseStore").finish_non_exhaustive()
    }
}

/// Rounds to two decimal places and checks the `NUMERIC(10, 2)` range.
///
/// Negative amounts are accepted. Exponent notation such as `1e100000000`
/// is rejected from the digit count and exponent alone, before any
/// rescaling could expand it.
pub fn normalize_amount(amount: BigDecimal) -> Result<BigDecimal, ExpenseError> {
    if amount.is_zero() {
        return Ok(BigDecimal::zero().with_scale(2));
    }

    let (_, scale) = amount.as_bigint_and_exponent();
    let integer_digits = amount.digits() as i64 - scale;
    if scale > MAX_INPUT_SCALE || integer_digits > MAX_INTEGER_DIGITS {
        return Err(ExpenseError::AmountOutOfRange);
    }

    let rounded = amount.round(2).with_scale(2);
    if rounded.abs() >= BigDecimal::from(AMOUNT_LIMIT) {
        return Err(ExpenseError::AmountOutOfRange);
    }

    Ok(rounded)
}
