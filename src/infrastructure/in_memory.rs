use super::Keyed;
use crate::domain::billing::BillPayment;
use crate::domain::ports::{BillPaymentStore, SavingBoxStore, TransactionStore};
use crate::domain::saving_box::SavingBox;
use crate::domain::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Table<T> {
    last_id: u64,
    rows: HashMap<u64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: HashMap::new(),
        }
    }
}

/// A thread-safe in-memory store keyed by record id.
///
/// Uses `Arc<RwLock<..>>` to allow shared concurrent access; clones share
/// the same table. Ideal for testing or sessions where persistence is not
/// required.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    table: Arc<RwLock<Table<T>>>,
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::default())),
        }
    }
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

pub type InMemoryTransactionStore = InMemoryStore<Transaction>;
pub type InMemorySavingBoxStore = InMemoryStore<SavingBox>;
pub type InMemoryBillPaymentStore = InMemoryStore<BillPayment>;

impl<T: Keyed + Clone + Send + Sync> InMemoryStore<T> {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn reserve_id(&self) -> u64 {
        let mut table = self.table.write().await;
        table.last_id += 1;
        table.last_id
    }

    async fn insert(&self, record: T) {
        let mut table = self.table.write().await;
        let id = record.key();
        table.last_id = table.last_id.max(id);
        table.rows.insert(id, record);
    }

    async fn find(&self, id: u64) -> Option<T> {
        self.table.read().await.rows.get(&id).cloned()
    }

    async fn take(&self, id: u64) -> Option<T> {
        self.table.write().await.rows.remove(&id)
    }

    async fn rows(&self) -> Vec<T> {
        let table = self.table.read().await;
        let mut rows: Vec<T> = table.rows.values().cloned().collect();
        rows.sort_by_key(|row| row.key());
        rows
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore<Transaction> {
    async fn next_id(&self) -> Result<u64> {
        Ok(self.reserve_id().await)
    }

    async fn store(&self, tx: Transaction) -> Result<()> {
        self.insert(tx).await;
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<Transaction>> {
        Ok(self.find(id).await)
    }

    async fn remove(&self, id: u64) -> Result<Option<Transaction>> {
        Ok(self.take(id).await)
    }

    async fn all(&self) -> Result<Vec<Transaction>> {
        Ok(self.rows().await)
    }
}

#[async_trait]
impl SavingBoxStore for InMemoryStore<SavingBox> {
    async fn next_id(&self) -> Result<u64> {
        Ok(self.reserve_id().await)
    }

    async fn store(&self, saving_box: SavingBox) -> Result<()> {
        self.insert(saving_box).await;
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<SavingBox>> {
        Ok(self.find(id).await)
    }

    async fn remove(&self, id: u64) -> Result<Option<SavingBox>> {
        Ok(self.take(id).await)
    }

    async fn all(&self) -> Result<Vec<SavingBox>> {
        Ok(self.rows().await)
    }
}

#[async_trait]
impl BillPaymentStore for InMemoryStore<BillPayment> {
    async fn next_id(&self) -> Result<u64> {
        Ok(self.reserve_id().await)
    }

    async fn store(&self, payment: BillPayment) -> Result<()> {
        self.insert(payment).await;
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<BillPayment>> {
        Ok(self.find(id).await)
    }

    async fn remove(&self, id: u64) -> Result<Option<BillPayment>> {
        Ok(self.take(id).await)
    }

    async fn all(&self) -> Result<Vec<BillPayment>> {
        Ok(self.rows().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Amount, Money};
    use crate::domain::saving_box::NewSavingBox;
    use crate::domain::transaction::{NewTransaction, TransactionKind};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn transaction(id: u64) -> Transaction {
        let new = NewTransaction::new(
            TransactionKind::Income,
            Amount::new(dec!(100.0)).unwrap(),
            "Salary",
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        );
        Transaction::from_new(id, new, Utc::now())
    }

    #[tokio::test]
    async fn test_in_memory_transaction_store() {
        let store = InMemoryTransactionStore::new();
        let id = store.next_id().await.unwrap();
        let tx = transaction(id);

        store.store(tx.clone()).await.unwrap();
        let retrieved = store.get(id).await.unwrap().unwrap();
        assert_eq!(retrieved, tx);

        assert!(store.get(id + 1).await.unwrap().is_none());
        assert_eq!(store.remove(id).await.unwrap(), Some(tx));
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_never_reuse_stored_keys() {
        let store = InMemoryTransactionStore::new();
        store.store(transaction(41)).await.unwrap();
        assert_eq!(store.next_id().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_in_memory_saving_box_store_shares_state_across_clones() {
        let store = InMemorySavingBoxStore::new();
        let other = store.clone();
        let saving_box = SavingBox::create(
            1,
            NewSavingBox {
                name: "Trip".into(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

        store.store(saving_box).await.unwrap();
        let all = other.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].balance, Money::ZERO);
    }

    #[tokio::test]
    async fn test_remove_bill_payment_by_transaction() {
        let store = InMemoryBillPaymentStore::new();
        let payment = BillPayment {
            id: 1,
            transaction_id: 7,
            paid_on: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            year: 2024,
            month: 1,
            amount: Money::new(dec!(50)),
            charges: Vec::new(),
        };
        store.store(payment.clone()).await.unwrap();

        assert_eq!(store.remove_by_transaction(8).await.unwrap(), None);
        assert_eq!(store.remove_by_transaction(7).await.unwrap(), Some(payment));
        assert!(store.all().await.unwrap().is_empty());
    }
}
