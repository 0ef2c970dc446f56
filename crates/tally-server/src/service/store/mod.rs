//! Storage seam for identities and expenses.
//!
//! Services talk to storage only through the traits in this module. The
//! PostgreSQL implementation is used in production; the in-memory one backs
//! tests and storage-free runs.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use jiff::Timestamp;
use serde::Serialize;

pub use self::error::{StoreError, StoreResult};
pub use self::memory::MemoryBackend;
pub use self::postgres::PgBackend;

/// Public view of a registered identity. Never carries the password hash.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
}

/// An identity together with its stored password hash.
#[derive(Debug, Clone)]
pub struct StoredIdentity {
    pub identity: Identity,
    pub password_hash: String,
}

/// Columns written when registering a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}

/// Profile changes; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentityChanges {
    /// `Some(None)` clears the email.
    pub email: Option<Option<String>>,
    pub password_hash: Option<String>,
}

/// A stored expense.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub id: i32,
    pub owner: String,
    pub description: String,
    pub amount: BigDecimal,
    pub occurred_at: Timestamp,
}

/// Fields of an expense about to be created. The owner is passed separately.
#[derive(Debug, Clone)]
pub struct NewExpenseRecord {
    pub description: String,
    pub amount: BigDecimal,
    pub occurred_at: Timestamp,
}

/// Replacement fields for an existing expense.
#[derive(Debug, Clone)]
pub struct ExpenseChanges {
    pub description: String,
    pub amount: BigDecimal,
    /// `None` keeps the stored timestamp.
    pub occurred_at: Option<Timestamp>,
}

/// Live connectivity check against the backing store.
#[async_trait]
pub trait StorageProbe: Send + Sync {
    /// Performs a round trip to storage.
    async fn ping(&self) -> StoreResult<()>;
}

/// Persistence for identity records.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Inserts an identity. Fails with [`StoreError::Conflict`] if the
    /// username is taken.
    async fn insert_identity(&self, new_identity: NewIdentity) -> StoreResult<Identity>;

    /// Looks up an identity and its password hash.
    async fn find_identity(&self, username: &str) -> StoreResult<Option<StoredIdentity>>;

    /// Applies profile changes. Returns `None` if the username is unknown.
    async fn update_identity(
        &self,
        username: &str,
        changes: IdentityChanges,
    ) -> StoreResult<Option<Identity>>;

    /// Removes an identity together with every expense it owns, atomically.
    /// Returns whether it existed.
    async fn delete_identity(&self, username: &str) -> StoreResult<bool>;

    /// Lists all identities ordered by id.
    async fn list_identities(&self) -> StoreResult<Vec<Identity>>;
}

/// Persistence for expense records.
///
/// Every method takes the owner and must include it in the storage
/// predicate, so records of other owners are never read or touched.
#[async_trait]
pub trait ExpenseBackend: Send + Sync {
    /// Inserts a record owned by `owner` and returns it with its id.
    async fn insert_expense(
        &self,
        owner: &str,
        record: NewExpenseRecord,
    ) -> StoreResult<ExpenseRecord>;

    /// Lists the records owned by `owner`, ordered by date then id.
    async fn list_expenses(&self, owner: &str) -> StoreResult<Vec<ExpenseRecord>>;

    /// Updates the record matching `id` and `owner`. Returns whether one matched.
    async fn update_expense(
        &self,
        owner: &str,
        id: i32,
        changes: ExpenseChanges,
    ) -> StoreResult<bool>;

    /// Deletes the record matching `id` and `owner`. Returns whether one matched.
    async fn delete_expense(&self, owner: &str, id: i32) -> StoreResult<bool>;
}
