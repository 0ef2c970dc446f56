//! Expense repository.
//!
//! Every statement filters on `username = owner`. Records belonging to other
//! users are invisible here rather than filtered after loading.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{Expense, NewExpense, UpdateExpense};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for owner-scoped expense operations.
pub trait ExpenseRepository {
    /// Inserts a new expense and returns it with its assigned id.
    fn create_expense(
        &mut self,
        new_expense: NewExpense,
    ) -> impl Future<Output = PgResult<Expense>> + Send;

    /// Lists the owner's expenses ordered by date, then id.
    fn list_expenses(&mut self, owner: &str)
    -> impl Future<Output = PgResult<Vec<Expense>>> + Send;

    /// Updates an expense matching both `id` and `owner`.
    ///
    /// Returns `None` when nothing matched.
    fn update_expense(
        &mut self,
        owner: &str,
        expense_id: i32,
        changes: UpdateExpense,
    ) -> impl Future<Output = PgResult<Option<Expense>>> + Send;

    /// Deletes an expense matching both `id` and `owner`.
    ///
    /// Returns the number of deleted rows (zero or one).
    fn delete_expense(
        &mut self,
        owner: &str,
        expense_id: i32,
    ) -> impl Future<Output = PgResult<usize>> + Send;

    /// Deletes every expense of `owner`. Returns the number of deleted rows.
    fn delete_expenses_of(&mut self, owner: &str) -> impl Future<Output = PgResult<usize>> + Send;
}

impl ExpenseRepository for PgConnection {
    async fn create_expense(&mut self, new_expense: NewExpense) -> PgResult<Expense> {
        use schema::expenses;

        diesel::insert_into(expenses::table)
            .values(&new_expense)
            .returning(Expense::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_expenses(&mut self, owner: &str) -> PgResult<Vec<Expense>> {
        use schema::expenses::{self, dsl};

        expenses::table
            .filter(dsl::username.eq(owner))
            .order((dsl::date.asc(), dsl::id.asc()))
            .select(Expense::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_expense(
        &mut self,
        owner: &str,
        expense_id: i32,
        changes: UpdateExpense,
    ) -> PgResult<Option<Expense>> {
        use schema::expenses::{self, dsl};

        let scoped = expenses::table
            .filter(dsl::id.eq(expense_id))
            .filter(dsl::username.eq(owner));

        let updated = diesel::update(scoped)
            .set(&changes)
            .returning(Expense::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            expense_id,
            matched = updated.is_some(),
            "Owner-scoped expense update"
        );

        Ok(updated)
    }

    async fn delete_expense(&mut self, owner: &str, expense_id: i32) -> PgResult<usize> {
        use schema::expenses::{self, dsl};

        let scoped = expenses::table
            .filter(dsl::id.eq(expense_id))
            .filter(dsl::username.eq(owner));

        let deleted = diesel::delete(scoped)
            .execute(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            expense_id,
            deleted,
            "Owner-scoped expense delete"
        );

        Ok(deleted)
    }

    async fn delete_expenses_of(&mut self, owner: &str) -> PgResult<usize> {
        use schema::expenses::{self, dsl};

        let deleted = diesel::delete(expenses::table.filter(dsl::username.eq(owner)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_QUERY, deleted, "Deleted all expenses of an owner");
        Ok(deleted)
    }
}
