use super::TransactionRecord;
use crate::domain::transaction::Transaction;
use crate::error::Result;
use std::io::Write;

/// Writes transactions as CSV, one row per transaction, header first.
pub struct TransactionWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TransactionWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_transactions<'a, I>(&mut self, transactions: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        for tx in transactions {
            self.writer.serialize(TransactionRecord::from(tx))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: Some(tx.id),
            kind: tx.kind,
            amount: tx.amount.to_string(),
            category: tx.category.clone(),
            description: tx.description.clone(),
            date: tx.date,
            payment_method: tx.payment_method,
            recurring: Some(tx.recurring),
            logo: tx.logo.clone(),
            installment_count: tx.installment_count,
            installment_mode: tx.installment_mode,
            interest_per_month: tx.interest_per_month.map(|i| i.to_string()),
            first_due_date: tx.first_due_date,
            created_at: Some(tx.created_at),
        }
    }
}
