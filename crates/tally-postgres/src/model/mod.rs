//! Database models for the `users` and `expenses` tables.

mod expense;
mod user;

pub use expense::{Expense, NewExpense, UpdateExpense};
pub use user::{NewUser, UpdateUser, User};
