mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use solvix::application::finance::FinanceService;
use solvix::domain::money::Money;
use solvix::infrastructure::clock::FixedClock;
use solvix::infrastructure::in_memory::{
    InMemoryBillPaymentStore, InMemorySavingBoxStore, InMemoryTransactionStore,
};
use solvix::interfaces::csv::transaction_reader::TransactionReader;
use std::fs::File;

fn service() -> FinanceService {
    FinanceService::new(
        Box::new(InMemoryTransactionStore::new()),
        Box::new(InMemorySavingBoxStore::new()),
        Box::new(InMemoryBillPaymentStore::new()),
        Box::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 28).unwrap())),
    )
}

#[test]
fn test_generate_simple_csv() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("generated.csv");
    common::generate_csv(&output_path, 5).expect("Failed to generate CSV");

    let content = std::fs::read_to_string(&output_path).expect("Failed to read file");
    // Header + 5 rows
    assert_eq!(content.lines().count(), 6);
}

#[tokio::test]
async fn test_random_ledger_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("random.csv");
    common::generate_random_csv(&output_path, 300).expect("Failed to generate CSV");

    let service = service();
    let reader = TransactionReader::new(File::open(&output_path).unwrap());
    let mut income = Decimal::ZERO;
    let mut debit = Decimal::ZERO;
    let mut credit = Decimal::ZERO;
    for row in reader.transactions() {
        let tx = service.create_transaction(row.unwrap()).await.unwrap();
        match (tx.category.as_str(), tx.amount.value()) {
            ("Salary", value) => income += value,
            ("Food", value) => debit += value,
            (_, value) => credit += value,
        }
    }

    let summary = service.summary().await.unwrap();
    assert_eq!(summary.total_income, Money::new(income));
    assert_eq!(summary.total_expenses, Money::new(debit));
    assert_eq!(summary.balance, Money::new(income - debit));
    assert_eq!(summary.credit_card_bill, Money::new(credit));

    let bill = service.current_bill().await.unwrap();
    assert!(bill.total >= Money::ZERO);
    if !bill.is_empty() {
        service.pay_bill(None).await.unwrap();
        let summary = service.summary().await.unwrap();
        assert_eq!(summary.credit_card_bill, Money::ZERO);
        assert_eq!(summary.balance, Money::new(income - debit - credit));
    }
}
