use super::billing::BillPayment;
use super::saving_box::SavingBox;
use super::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Reserves the next transaction id.
    async fn next_id(&self) -> Result<u64>;
    async fn store(&self, tx: Transaction) -> Result<()>;
    async fn get(&self, id: u64) -> Result<Option<Transaction>>;
    /// Removes a transaction, returning it if it existed.
    async fn remove(&self, id: u64) -> Result<Option<Transaction>>;
    async fn all(&self) -> Result<Vec<Transaction>>;
}

#[async_trait]
pub trait SavingBoxStore: Send + Sync {
    async fn next_id(&self) -> Result<u64>;
    async fn store(&self, saving_box: SavingBox) -> Result<()>;
    async fn get(&self, id: u64) -> Result<Option<SavingBox>>;
    async fn remove(&self, id: u64) -> Result<Option<SavingBox>>;
    async fn all(&self) -> Result<Vec<SavingBox>>;
}

#[async_trait]
pub trait BillPaymentStore: Send + Sync {
    async fn next_id(&self) -> Result<u64>;
    async fn store(&self, payment: BillPayment) -> Result<()>;
    async fn get(&self, id: u64) -> Result<Option<BillPayment>>;
    async fn remove(&self, id: u64) -> Result<Option<BillPayment>>;
    async fn all(&self) -> Result<Vec<BillPayment>>;

    /// Removes the settlement recorded by the given "Bill Payment" transaction.
    async fn remove_by_transaction(&self, transaction_id: u64) -> Result<Option<BillPayment>> {
        let linked = self
            .all()
            .await?
            .into_iter()
            .find(|p| p.transaction_id == transaction_id);
        match linked {
            Some(payment) => self.remove(payment.id).await,
            None => Ok(None),
        }
    }
}

/// Source of the current date, so billing cycles can be pinned in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type SavingBoxStoreBox = Box<dyn SavingBoxStore>;
pub type BillPaymentStoreBox = Box<dyn BillPaymentStore>;
pub type ClockBox = Box<dyn Clock>;
