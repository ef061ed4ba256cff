use super::billing::BillingInfo;
use super::money::Money;
use super::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Headline figures of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: Money,
    /// Cash outflow: debit expenses, bill payments, and expenses without a method.
    pub total_expenses: Money,
    pub credit_card_bill: Money,
    pub balance: Money,
}

impl Summary {
    /// Aggregates the transaction list.
    ///
    /// The bill comes from `billing` when a server snapshot is available;
    /// otherwise it falls back to credit expenses minus bill payments, never
    /// below zero.
    pub fn calculate(transactions: &[Transaction], billing: Option<&BillingInfo>) -> Self {
        let total_income: Money = transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| Money::from(t.amount))
            .sum();
        let total_expenses: Money = transactions
            .iter()
            .filter(|t| t.is_cash_outflow())
            .map(|t| Money::from(t.amount))
            .sum();

        let credit_card_bill = match billing {
            Some(snapshot) => snapshot.total.non_negative(),
            None => {
                let credit: Money = transactions
                    .iter()
                    .filter(|t| t.is_credit_expense())
                    .map(|t| Money::from(t.amount))
                    .sum();
                let paid: Money = transactions
                    .iter()
                    .filter(|t| t.is_bill_payment())
                    .map(|t| Money::from(t.amount))
                    .sum();
                (credit - paid).non_negative()
            }
        };

        Self {
            total_income,
            total_expenses,
            credit_card_bill,
            balance: total_income - total_expenses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::BillingCycle;
    use crate::domain::category;
    use crate::domain::money::Amount;
    use crate::domain::transaction::{NewTransaction, PaymentMethod, TransactionKind};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn tx(
        id: u64,
        kind: TransactionKind,
        amount: Decimal,
        category: &str,
        method: Option<PaymentMethod>,
    ) -> Transaction {
        let mut new = NewTransaction::new(
            kind,
            Amount::new(amount).unwrap(),
            category,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        );
        new.payment_method = method;
        Transaction::from_new(id, new, Utc::now())
    }

    #[test]
    fn test_income_and_debit_expense() {
        let transactions = vec![
            tx(1, TransactionKind::Income, dec!(1000), "Salary", None),
            tx(
                2,
                TransactionKind::Expense,
                dec!(200),
                "Food",
                Some(PaymentMethod::Debit),
            ),
        ];
        let summary = Summary::calculate(&transactions, None);
        assert_eq!(summary.balance, Money::new(dec!(800)));
        assert_eq!(summary.credit_card_bill, Money::ZERO);
    }

    #[test]
    fn test_credit_expenses_go_to_bill_not_balance() {
        let transactions = vec![
            tx(1, TransactionKind::Income, dec!(1000), "Salary", None),
            tx(
                2,
                TransactionKind::Expense,
                dec!(300),
                "Shopping",
                Some(PaymentMethod::Credit),
            ),
            tx(3, TransactionKind::Expense, dec!(50), "Food", None),
            tx(
                4,
                TransactionKind::Expense,
                dec!(100),
                category::BILL_PAYMENT,
                Some(PaymentMethod::Credit),
            ),
        ];
        let summary = Summary::calculate(&transactions, None);
        assert_eq!(summary.total_expenses, Money::new(dec!(150)));
        assert_eq!(summary.credit_card_bill, Money::new(dec!(200)));
        assert_eq!(summary.balance, Money::new(dec!(850)));
    }

    #[test]
    fn test_fallback_bill_never_negative() {
        let transactions = vec![tx(
            1,
            TransactionKind::Expense,
            dec!(100),
            category::BILL_PAYMENT,
            None,
        )];
        let summary = Summary::calculate(&transactions, None);
        assert_eq!(summary.credit_card_bill, Money::ZERO);
    }

    #[test]
    fn test_snapshot_overrides_fallback() {
        let transactions = vec![tx(
            1,
            TransactionKind::Expense,
            dec!(300),
            "Shopping",
            Some(PaymentMethod::Credit),
        )];
        let mut snapshot = BillingInfo::empty(BillingCycle { year: 2024, month: 1 });
        snapshot.total = Money::new(dec!(120));
        let summary = Summary::calculate(&transactions, Some(&snapshot));
        assert_eq!(summary.credit_card_bill, Money::new(dec!(120)));
    }

    #[test]
    fn test_empty_list() {
        let summary = Summary::calculate(&[], None);
        assert_eq!(summary.balance, Money::ZERO);
        assert_eq!(summary.total_income, Money::ZERO);
    }
}
