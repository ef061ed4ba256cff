use super::TransactionRecord;
use crate::domain::money::Amount;
use crate::domain::transaction::NewTransaction;
use crate::error::{FinanceError, Result};
use rust_decimal::Decimal;
use std::io::Read;

/// Reads transactions from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<NewTransaction>`. It handles whitespace trimming and flexible record
/// lengths automatically.
pub struct TransactionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TransactionReader<R> {
    /// Creates a new `TransactionReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and converts transactions.
    ///
    /// Each line is checked on its own, so one bad row does not stop the rest.
    pub fn transactions(self) -> impl Iterator<Item = Result<NewTransaction>> {
        self.reader
            .into_deserialize::<TransactionRecord>()
            .map(|result| result.map_err(FinanceError::from).and_then(to_new_transaction))
    }
}

fn to_new_transaction(record: TransactionRecord) -> Result<NewTransaction> {
    let amount = Amount::parse(&record.amount)?;
    let interest_per_month = match record.interest_per_month.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(text) => Some(text.replace(',', ".").parse::<Decimal>().map_err(|_| {
            FinanceError::validation(format!("Invalid interest_per_month '{text}'"))
        })?),
    };

    let mut new = NewTransaction::new(record.kind, amount, record.category, record.date);
    new.description = record.description;
    new.payment_method = record.payment_method;
    new.recurring = record.recurring.unwrap_or(false);
    new.logo = record.logo;
    if let Some(count) = record.installment_count.filter(|c| *c > 1) {
        new = new.with_installments(
            count,
            record.installment_mode.unwrap_or_default(),
            interest_per_month,
        );
        new.first_due_date = record.first_due_date;
    }
    Ok(new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{InstallmentMode, PaymentMethod, TransactionKind};
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "type, amount, category, description, date, payment_method\n\
                    income, 3000, Salary, , 2024-01-05,\n\
                    expense,\"12,90\",Food, Lunch ,2024-01-06,debit";
        let reader = TransactionReader::new(data.as_bytes());
        let results: Vec<Result<NewTransaction>> = reader.transactions().collect();

        assert_eq!(results.len(), 2);
        let salary = results[0].as_ref().unwrap();
        assert_eq!(salary.kind, TransactionKind::Income);
        assert_eq!(salary.description, None);
        let lunch = results[1].as_ref().unwrap();
        assert_eq!(lunch.amount.value(), dec!(12.90));
        assert_eq!(lunch.payment_method, Some(PaymentMethod::Debit));
    }

    #[test]
    fn test_reader_installment_columns() {
        let data = "type,amount,category,date,payment_method,installment_count,installment_mode,interest_per_month\n\
                    expense,1000,Electronics,2024-02-10,credit,12,total,\"1,5\"";
        let new = TransactionReader::new(data.as_bytes())
            .transactions()
            .next()
            .unwrap()
            .unwrap();
        assert!(new.is_installment);
        assert_eq!(new.installment_count, Some(12));
        assert_eq!(new.installment_mode, Some(InstallmentMode::Total));
        assert_eq!(new.interest_per_month, Some(dec!(1.5)));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "type,amount,category,date\ntransfer,1,Food,2024-01-01\nexpense,-5,Food,2024-01-01\nexpense,5,Food,2024-01-01";
        let reader = TransactionReader::new(data.as_bytes());
        let results: Vec<Result<NewTransaction>> = reader.transactions().collect();

        assert!(results[0].is_err());
        assert!(matches!(results[1], Err(FinanceError::ValidationError(_))));
        assert!(results[2].is_ok());
    }
}
