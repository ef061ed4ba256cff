use crate::domain::billing::BillPayment;
use crate::domain::ports::{BillPaymentStore, SavingBoxStore, TransactionStore};
use crate::domain::saving_box::SavingBox;
use crate::domain::transaction::Transaction;
use crate::error::{FinanceError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing transactions.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family for storing saving boxes with their ledgers.
pub const CF_SAVING_BOXES: &str = "saving_boxes";
/// Column Family for storing bill settlements.
pub const CF_BILL_PAYMENTS: &str = "bill_payments";
/// Column Family holding the id counters, keyed by the column family they serve.
pub const CF_META: &str = "meta";

/// A persistent store implementation using RocksDB.
///
/// Each entity lives in its own Column Family, keyed by its big-endian id so
/// iteration follows creation order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

fn internal(message: String) -> FinanceError {
    FinanceError::InternalError(Box::new(std::io::Error::other(message)))
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_TRANSACTIONS, CF_SAVING_BOXES, CF_BILL_PAYMENTS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| internal(format!("Column family '{name}' not found")))
    }

    fn next_id_in(&self, name: &str) -> Result<u64> {
        let meta = self.cf(CF_META)?;
        let last = match self.db.get_cf(&meta, name)? {
            Some(bytes) => decode_id(&bytes)?,
            None => 0,
        };
        let next = last + 1;
        self.db.put_cf(&meta, name, next.to_be_bytes())?;
        Ok(next)
    }

    fn bump_counter(&self, name: &str, id: u64) -> Result<()> {
        let meta = self.cf(CF_META)?;
        let last = match self.db.get_cf(&meta, name)? {
            Some(bytes) => decode_id(&bytes)?,
            None => 0,
        };
        if id > last {
            self.db.put_cf(&meta, name, id.to_be_bytes())?;
        }
        Ok(())
    }

    fn put<T: Serialize>(&self, name: &str, id: u64, value: &T) -> Result<()> {
        let cf = self.cf(name)?;
        let bytes = serde_json::to_vec(value).map_err(|e| {
            FinanceError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )))
        })?;
        self.db.put_cf(&cf, id.to_be_bytes(), bytes)?;
        self.bump_counter(name, id)
    }

    fn fetch<T: DeserializeOwned>(&self, name: &str, id: u64) -> Result<Option<T>> {
        let cf = self.cf(name)?;
        match self.db.get_cf(&cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn delete<T: DeserializeOwned>(&self, name: &str, id: u64) -> Result<Option<T>> {
        let existing = self.fetch(name, id)?;
        if existing.is_some() {
            let cf = self.cf(name)?;
            self.db.delete_cf(&cf, id.to_be_bytes())?;
        }
        Ok(existing)
    }

    fn scan<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let handle = self.cf(name)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(handle, IteratorMode::Start) {
            let (_key, value) =
                item.map_err(|e| internal(format!("RocksDB iteration error: {}", e)))?;
            rows.push(decode(&value)?);
        }
        Ok(rows)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        FinanceError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

fn decode_id(bytes: &[u8]) -> Result<u64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| internal("Corrupt id counter".to_string()))?;
    Ok(u64::from_be_bytes(raw))
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn next_id(&self) -> Result<u64> {
        self.next_id_in(CF_TRANSACTIONS)
    }

    async fn store(&self, tx: Transaction) -> Result<()> {
        self.put(CF_TRANSACTIONS, tx.id, &tx)
    }

    async fn get(&self, id: u64) -> Result<Option<Transaction>> {
        self.fetch(CF_TRANSACTIONS, id)
    }

    async fn remove(&self, id: u64) -> Result<Option<Transaction>> {
        self.delete(CF_TRANSACTIONS, id)
    }

    async fn all(&self) -> Result<Vec<Transaction>> {
        self.scan(CF_TRANSACTIONS)
    }
}

#[async_trait]
impl SavingBoxStore for RocksDBStore {
    async fn next_id(&self) -> Result<u64> {
        self.next_id_in(CF_SAVING_BOXES)
    }

    async fn store(&self, saving_box: SavingBox) -> Result<()> {
        self.put(CF_SAVING_BOXES, saving_box.id, &saving_box)
    }

    async fn get(&self, id: u64) -> Result<Option<SavingBox>> {
        self.fetch(CF_SAVING_BOXES, id)
    }

    async fn remove(&self, id: u64) -> Result<Option<SavingBox>> {
        self.delete(CF_SAVING_BOXES, id)
    }

    async fn all(&self) -> Result<Vec<SavingBox>> {
        self.scan(CF_SAVING_BOXES)
    }
}

#[async_trait]
impl BillPaymentStore for RocksDBStore {
    async fn next_id(&self) -> Result<u64> {
        self.next_id_in(CF_BILL_PAYMENTS)
    }

    async fn store(&self, payment: BillPayment) -> Result<()> {
        self.put(CF_BILL_PAYMENTS, payment.id, &payment)
    }

    async fn get(&self, id: u64) -> Result<Option<BillPayment>> {
        self.fetch(CF_BILL_PAYMENTS, id)
    }

    async fn remove(&self, id: u64) -> Result<Option<BillPayment>> {
        self.delete(CF_BILL_PAYMENTS, id)
    }

    async fn all(&self) -> Result<Vec<BillPayment>> {
        self.scan(CF_BILL_PAYMENTS)
    }
}
