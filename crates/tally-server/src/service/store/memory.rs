//! In-memory storage backend.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    ExpenseBackend, ExpenseChanges, ExpenseRecord, Identity, IdentityBackend, IdentityChanges,
    NewExpenseRecord, NewIdentity, StorageProbe, StoreError, StoreResult, StoredIdentity,
};

/// Volatile storage backend keeping everything in process memory.
///
/// Clones share the same data. Ids are assigned from per-table counters
/// starting at 1, like a `SERIAL` column.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<MemoryInner>>,
    unavailable: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    users: BTreeMap<String, StoredIdentity>,
    expenses: BTreeMap<i32, ExpenseRecord>,
    last_user_id: i32,
    last_expense_id: i32,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing (or regaining) the connection to storage.
    ///
    /// While unavailable, every operation fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory backend offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProbe for MemoryBackend {
    async fn ping(&self) -> StoreResult<()> {
        self.ensure_available()
    }
}

#[async_trait]
impl IdentityBackend for MemoryBackend {
    async fn insert_identity(&self, new_identity: NewIdentity) -> StoreResult<Identity> {
        self.ensure_available()?;
        let mut inner = self.inner.write().await;

        if inner.users.contains_key(&new_identity.username) {
            return Err(StoreError::Conflict("users_username_key".into()));
        }

        inner.last_user_id += 1;
        let identity = Identity {
            id: inner.last_user_id,
            username: new_identity.username,
            email: new_identity.email,
        };

        inner.users.insert(
            identity.username.clone(),
            StoredIdentity {
                identity: identity.clone(),
                password_hash: new_identity.password_hash,
            },
        );

        Ok(identity)
    }

    async fn find_identity(&self, username: &str) -> StoreResult<Option<StoredIdentity>> {
        self.ensure_available()?;
        Ok(self.inner.read().await.users.get(username).cloned())
    }

    async fn update_identity(
        &self,
        username: &str,
        changes: IdentityChanges,
    ) -> StoreResult<Option<Identity>> {
        self.ensure_available()?;
        let mut inner = self.inner.write().await;

        let Some(stored) = inner.users.get_mut(username) else {
            return Ok(None);
        };

        if let Some(email) = changes.email {
            stored.identity.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            stored.password_hash = password_hash;
        }

        Ok(Some(stored.identity.clone()))
    }

    async fn delete_identity(&self, username: &str) -> StoreResult<bool> {
        self.ensure_available()?;
        let mut inner = self.inner.write().await;

        if inner.users.remove(username).is_none() {
            return Ok(false);
        }
        inner.expenses.retain(|_, record| record.owner != username);
        Ok(true)
    }

    async fn list_identities(&self) -> StoreResult<Vec<Identity>> {
        self.ensure_available()?;
        let inner = self.inner.read().await;

        let mut identities: Vec<Identity> = inner
            .users
            .values()
            .map(|stored| stored.identity.clone())
            .collect();
        identities.sort_by_key(|identity| identity.id);

        Ok(identities)
    }
}

#[async_trait]
impl ExpenseBackend for MemoryBackend {
    async fn insert_expense(
        &self,
        owner: &str,
        record: NewExpenseRecord,
    ) -> StoreResult<ExpenseRecord> {
        self.ensure_available()?;
        let mut inner = self.inner.write().await;

        inner.last_expense_id += 1;
        let stored = ExpenseRecord {
            id: inner.last_expense_id,
            owner: owner.to_owned(),
            description: record.description,
            amount: record.amount,
            occurred_at: record.occurred_at,
        };

        inner.expenses.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_expenses(&self, owner: &str) -> StoreResult<Vec<ExpenseRecord>> {
        self.ensure_available()?;
        let inner = self.inner.read().await;

        let mut records: Vec<ExpenseRecord> = inner
            .expenses
            .values()
            .filter(|record| record.owner == owner)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));

        Ok(records)
    }

    async fn update_expense(
        &self,
        owner: &str,
        id: i32,
        changes: ExpenseChanges,
    ) -> StoreResult<bool> {
        self.ensure_available()?;
        let mut inner = self.inner.write().await;

        let Some(record) = inner
            .expenses
            .get_mut(&id)
            .filter(|record| record.owner == owner)
        else {
            return Ok(false);
        };

        record.description = changes.description;
        record.amount = changes.amount;
        if let Some(occurred_at) = changes.occurred_at {
            record.occurred_at = occurred_at;
        }

        Ok(true)
    }

    async fn delete_expense(&self, owner: &str, id: i32) -> StoreResult<bool> {
        self.ensure_available()?;
        let mut inner = self.inner.write().await;

        let owned = inner
            .expenses
            .get(&id)
            .is_some_and(|record| record.owner == owner);
        if owned {
            inner.expenses.remove(&id);
        }

        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use jiff::Timestamp;

    use super::*;

    fn new_record(description: &str) -> NewExpenseRecord {
        NewExpenseRecord {
            description: description.to_owned(),
            amount: BigDecimal::from_str("1.00").unwrap(),
            occurred_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() -> anyhow::Result<()> {
        let backend = MemoryBackend::new();
        let new_identity = NewIdentity {
            username: "alice".into(),
            email: None,
            password_hash: "hash".into(),
        };

        let first = backend.insert_identity(new_identity.clone()).await?;
        assert_eq!(first.id, 1);

        let second = backend.insert_identity(new_identity).await;
        assert!(matches!(second, Err(StoreError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn deleting_identity_drops_its_expenses() -> anyhow::Result<()> {
        let backend = MemoryBackend::new();
        let new_identity = NewIdentity {
            username: "alice".into(),
            email: None,
            password_hash: "hash".into(),
        };
        let _identity = backend.insert_identity(new_identity).await?;
        let _private = backend.insert_expense("alice", new_record("private")).await?;
        let kept = backend.insert_expense("bob", new_record("other")).await?;

        assert!(backend.delete_identity("alice").await?);
        assert!(backend.list_expenses("alice").await?.is_empty());
        assert_eq!(backend.list_expenses("bob").await?, vec![kept]);

        // Unknown identities leave expenses alone.
        assert!(!backend.delete_identity("bob").await?);
        assert_eq!(backend.list_expenses("bob").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially() -> anyhow::Result<()> {
        let backend = MemoryBackend::new();
        let a = backend.insert_expense("alice", new_record("a")).await?;
        let b = backend.insert_expense("bob", new_record("b")).await?;

        assert_eq!((a.id, b.id), (1, 2));
        Ok(())
    }

    #[tokio::test]
    async fn mutations_require_matching_owner() -> anyhow::Result<()> {
        let backend = MemoryBackend::new();
        let record = backend.insert_expense("alice", new_record("lunch")).await?;

        assert!(!backend.delete_expense("bob", record.id).await?);
        assert_eq!(backend.list_expenses("alice").await?.len(), 1);

        assert!(backend.delete_expense("alice", record.id).await?);
        assert!(backend.list_expenses("alice").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn offline_backend_fails_every_call() {
        let backend = MemoryBackend::new();
        backend.set_available(false);

        assert!(matches!(backend.ping().await, Err(StoreError::Unavailable(_))));
        assert!(backend.list_expenses("alice").await.is_err());

        backend.set_available(true);
        assert!(backend.ping().await.is_ok());
    }
}
