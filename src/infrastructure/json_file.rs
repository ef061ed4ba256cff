use crate::domain::billing::BillPayment;
use crate::domain::ports::{BillPaymentStore, SavingBoxStore, TransactionStore};
use crate::domain::saving_box::SavingBox;
use crate::domain::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Counters {
    transaction: u64,
    saving_box: u64,
    bill_payment: u64,
}

/// Everything the tracker persists, as written to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    last_ids: Counters,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    saving_boxes: Vec<SavingBox>,
    #[serde(default)]
    bill_payments: Vec<BillPayment>,
}

/// A store that keeps every collection in one JSON document.
///
/// The whole snapshot is rewritten after each mutation. Writes go to a
/// temporary file in the same directory which then replaces the target, so a
/// crash never leaves a half-written snapshot behind.
///
/// `Clone` shares the underlying state.
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl JsonFileStore {
    /// Opens the snapshot at `path`, starting empty if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Snapshot::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(
            path = %path.display(),
            transactions = snapshot.transactions.len(),
            saving_boxes = snapshot.saving_boxes.len(),
            "Loaded snapshot"
        );
        Ok(Self {
            path,
            snapshot: Arc::new(RwLock::new(snapshot)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, snapshot)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Applies `change` to a copy and only keeps it once it is on disk.
    async fn mutate<T>(&self, change: impl FnOnce(&mut Snapshot) -> T + Send) -> Result<T> {
        let mut snapshot = self.snapshot.write().await;
        let mut next = snapshot.clone();
        let out = change(&mut next);
        self.persist(&next)?;
        *snapshot = next;
        Ok(out)
    }
}

fn upsert<T>(rows: &mut Vec<T>, record: T, same: impl Fn(&T) -> bool) {
    match rows.iter_mut().find(|row| same(row)) {
        Some(existing) => *existing = record,
        None => rows.push(record),
    }
}

fn take<T>(rows: &mut Vec<T>, same: impl Fn(&T) -> bool) -> Option<T> {
    let index = rows.iter().position(same)?;
    Some(rows.remove(index))
}

#[async_trait]
impl TransactionStore for JsonFileStore {
    async fn next_id(&self) -> Result<u64> {
        self.mutate(|s| {
            s.last_ids.transaction += 1;
            s.last_ids.transaction
        })
        .await
    }

    async fn store(&self, tx: Transaction) -> Result<()> {
        self.mutate(|s| {
            s.last_ids.transaction = s.last_ids.transaction.max(tx.id);
            let id = tx.id;
            upsert(&mut s.transactions, tx, |row| row.id == id);
        })
        .await
    }

    async fn get(&self, id: u64) -> Result<Option<Transaction>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.transactions.iter().find(|t| t.id == id).cloned())
    }

    async fn remove(&self, id: u64) -> Result<Option<Transaction>> {
        self.mutate(|s| take(&mut s.transactions, |row| row.id == id))
            .await
    }

    async fn all(&self) -> Result<Vec<Transaction>> {
        Ok(self.snapshot.read().await.transactions.clone())
    }
}

#[async_trait]
impl SavingBoxStore for JsonFileStore {
    async fn next_id(&self) -> Result<u64> {
        self.mutate(|s| {
            s.last_ids.saving_box += 1;
            s.last_ids.saving_box
        })
        .await
    }

    async fn store(&self, saving_box: SavingBox) -> Result<()> {
        self.mutate(|s| {
            s.last_ids.saving_box = s.last_ids.saving_box.max(saving_box.id);
            let id = saving_box.id;
            upsert(&mut s.saving_boxes, saving_box, |row| row.id == id);
        })
        .await
    }

    async fn get(&self, id: u64) -> Result<Option<SavingBox>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.saving_boxes.iter().find(|b| b.id == id).cloned())
    }

    async fn remove(&self, id: u64) -> Result<Option<SavingBox>> {
        self.mutate(|s| take(&mut s.saving_boxes, |row| row.id == id))
            .await
    }

    async fn all(&self) -> Result<Vec<SavingBox>> {
        Ok(self.snapshot.read().await.saving_boxes.clone())
    }
}

#[async_trait]
impl BillPaymentStore for JsonFileStore {
    async fn next_id(&self) -> Result<u64> {
        self.mutate(|s| {
            s.last_ids.bill_payment += 1;
            s.last_ids.bill_payment
        })
        .await
    }

    async fn store(&self, payment: BillPayment) -> Result<()> {
        self.mutate(|s| {
            s.last_ids.bill_payment = s.last_ids.bill_payment.max(payment.id);
            let id = payment.id;
            upsert(&mut s.bill_payments, payment, |row| row.id == id);
        })
        .await
    }

    async fn get(&self, id: u64) -> Result<Option<BillPayment>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.bill_payments.iter().find(|p| p.id == id).cloned())
    }

    async fn remove(&self, id: u64) -> Result<Option<BillPayment>> {
        self.mutate(|s| take(&mut s.bill_payments, |row| row.id == id))
            .await
    }

    async fn all(&self) -> Result<Vec<BillPayment>> {
        Ok(self.snapshot.read().await.bill_payments.clone())
    }

    async fn remove_by_transaction(&self, transaction_id: u64) -> Result<Option<BillPayment>> {
        self.mutate(|s| take(&mut s.bill_payments, |row| row.transaction_id == transaction_id))
            .await
    }
}
