//! PostgreSQL storage backend.

use async_trait::async_trait;
use tally_postgres::PgClient;
use tally_postgres::model::{Expense, NewExpense, NewUser, UpdateExpense, UpdateUser, User};
use tally_postgres::query::{ExpenseRepository, UserRepository};

use super::{
    ExpenseBackend, ExpenseChanges, ExpenseRecord, Identity, IdentityBackend, IdentityChanges,
    NewExpenseRecord, NewIdentity, StorageProbe, StoreResult, StoredIdentity,
};

/// Storage backend over a [`PgClient`] connection pool.
#[derive(Debug, Clone)]
pub struct PgBackend {
    client: PgClient,
}

impl PgBackend {
    /// Wraps an existing client.
    pub fn new(client: PgClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    #[inline]
    pub fn client(&self) -> &PgClient {
        &self.client
    }
}

impl From<User> for StoredIdentity {
    fn from(user: User) -> Self {
        Self {
            identity: Identity {
                id: user.id,
                username: user.username,
                email: user.email,
            },
            password_hash: user.password_hash,
        }
    }
}

impl From<Expense> for ExpenseRecord {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            owner: expense.username,
            description: expense.description,
            amount: expense.amount,
            occurred_at: expense.date.into(),
        }
    }
}

#[async_trait]
impl StorageProbe for PgBackend {
    async fn ping(&self) -> StoreResult<()> {
        Ok(self.client.ping().await?)
    }
}

#[async_trait]
impl IdentityBackend for PgBackend {
    async fn insert_identity(&self, new_identity: NewIdentity) -> StoreResult<Identity> {
        let mut conn = self.client.get_connection().await?;
        let new_user = NewUser {
            username: new_identity.username,
            email: new_identity.email,
            password_hash: new_identity.password_hash,
        };

        let user = conn.create_user(new_user).await?;
        Ok(StoredIdentity::from(user).identity)
    }

    async fn find_identity(&self, username: &str) -> StoreResult<Option<StoredIdentity>> {
        let mut conn = self.client.get_connection().await?;
        let user = conn.find_user_by_username(username).await?;
        Ok(user.map(StoredIdentity::from))
    }

    async fn update_identity(
        &self,
        username: &str,
        changes: IdentityChanges,
    ) -> StoreResult<Option<Identity>> {
        let mut conn = self.client.get_connection().await?;
        let changes = UpdateUser {
            email: changes.email,
            password_hash: changes.password_hash,
        };

        let user = conn.update_user(username, changes).await?;
        Ok(user.map(|user| StoredIdentity::from(user).identity))
    }

    async fn delete_identity(&self, username: &str) -> StoreResult<bool> {
        let mut conn = self.client.get_connection().await?;
        let username = username.to_owned();

        let removed = conn
            .transaction(|conn| {
                Box::pin(async move {
                    conn.delete_expenses_of(&username).await?;
                    conn.delete_user(&username).await
                })
            })
            .await?;

        Ok(removed)
    }

    async fn list_identities(&self) -> StoreResult<Vec<Identity>> {
        let mut conn = self.client.get_connection().await?;
        let users = conn.list_users().await?;

        Ok(users
            .into_iter()
            .map(|user| StoredIdentity::from(user).identity)
            .collect())
    }
}

#[async_trait]
impl ExpenseBackend for PgBackend {
    async fn insert_expense(
        &self,
        owner: &str,
        record: NewExpenseRecord,
    ) -> StoreResult<ExpenseRecord> {
        let mut conn = self.client.get_connection().await?;
        let new_expense = NewExpense {
            username: owner.to_owned(),
            description: record.description,
            amount: record.amount,
            date: record.occurred_at.into(),
        };

        let expense = conn.create_expense(new_expense).await?;
        Ok(expense.into())
    }

    async fn list_expenses(&self, owner: &str) -> StoreResult<Vec<ExpenseRecord>> {
        let mut conn = self.client.get_connection().await?;
        let expenses = conn.list_expenses(owner).await?;
        Ok(expenses.into_iter().map(ExpenseRecord::from).collect())
    }

    async fn update_expense(
        &self,
        owner: &str,
        id: i32,
        changes: ExpenseChanges,
    ) -> StoreResult<bool> {
        let mut conn = self.client.get_connection().await?;
        let changes = UpdateExpense {
            description: changes.description,
            amount: changes.amount,
            date: changes.occurred_at.map(Into::into),
        };

        let updated = conn.update_expense(owner, id, changes).await?;
        Ok(updated.is_some())
    }

    async fn delete_expense(&self, owner: &str, id: i32) -> StoreResult<bool> {
        let mut conn = self.client.get_connection().await?;
        Ok(conn.delete_expense(owner, id).await? > 0)
    }
}
