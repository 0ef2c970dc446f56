//! Expense record model.

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::expenses;

/// A stored expense, owned by the user named in `username`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Expense {
    pub id: i32,
    /// Owner of the record.
    pub username: String,
    pub description: String,
    /// Amount with two decimal places.
    pub amount: BigDecimal,
    /// When the expense occurred.
    pub date: Timestamp,
}

/// Data for creating a new expense.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewExpense {
    pub username: String,
    pub description: String,
    pub amount: BigDecimal,
    pub date: Timestamp,
}

/// Field changes for an existing expense.
///
/// There is no owner column: records never change hands.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateExpense {
    pub description: String,
    pub amount: BigDecimal,
    pub date: Option<Timestamp>,
}
