//! CSV import and export of transactions.
//!
//! Both directions share the same columns; `id` and `created_at` are written
//! on export and ignored on import.

pub mod transaction_reader;
pub mod transaction_writer;

use crate::domain::transaction::{InstallmentMode, PaymentMethod, TransactionKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One CSV line. Amounts stay textual so `,` decimal separators survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub recurring: Option<bool>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub installment_count: Option<u32>,
    #[serde(default)]
    pub installment_mode: Option<InstallmentMode>,
    #[serde(default)]
    pub interest_per_month: Option<String>,
    #[serde(default)]
    pub first_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
