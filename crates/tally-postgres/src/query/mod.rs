//! Repository traits implemented for [`PgConnection`].
//!
//! [`PgConnection`]: crate::PgConnection

mod expense;
mod user;

pub use expense::ExpenseRepository;
pub use user::UserRepository;
