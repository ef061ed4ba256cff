//! Adapters for the store and clock ports.

pub mod clock;
pub mod in_memory;
pub mod json_file;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::domain::billing::BillPayment;
use crate::domain::saving_box::SavingBox;
use crate::domain::transaction::Transaction;

/// Records that carry their own numeric key.
pub trait Keyed {
    fn key(&self) -> u64;
}

impl Keyed for Transaction {
    fn key(&self) -> u64 {
        self.id
    }
}

impl Keyed for SavingBox {
    fn key(&self) -> u64 {
        self.id
    }
}

impl Keyed for BillPayment {
    fn key(&self) -> u64 {
        self.id
    }
}
