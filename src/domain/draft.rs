//! Form input for a new transaction and the rules that turn it into a request.

use super::category;
use super::money::Amount;
use super::transaction::{InstallmentMode, NewTransaction, PaymentMethod, TransactionKind};
use crate::error::{FinanceError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Raw values as typed by the user.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionDraft {
    pub kind: Option<TransactionKind>,
    /// Free text; both `,` and `.` are accepted as decimal separator.
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub recurring: bool,
    /// Catalog name of the subscription service.
    pub subscription_service: Option<String>,
    pub installment_count: Option<u32>,
    pub installment_mode: Option<InstallmentMode>,
    pub interest_per_month: Option<Decimal>,
    pub first_due_date: Option<NaiveDate>,
}

/// What submitting a draft should do.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftOutcome {
    Create(NewTransaction),
    /// A "Bill Payment" draft settles the current bill instead.
    PayBill { payment_date: Option<NaiveDate> },
}

impl TransactionDraft {
    fn kind(&self) -> TransactionKind {
        self.kind.unwrap_or(TransactionKind::Expense)
    }

    fn is_expense_in(&self, name: &str) -> bool {
        self.kind() == TransactionKind::Expense && self.category.trim() == name
    }

    pub fn into_outcome(self) -> Result<DraftOutcome> {
        if self.is_expense_in(category::BILL_PAYMENT) {
            return Ok(DraftOutcome::PayBill {
                payment_date: self.date,
            });
        }

        let kind = self.kind();
        let is_expense = kind == TransactionKind::Expense;
        let is_subscription = self.is_expense_in(category::SUBSCRIPTIONS);
        let category = self.category.trim().to_string();

        let amount = Amount::parse(&self.amount).ok();
        let (Some(amount), Some(date)) = (amount, self.date) else {
            return Err(incomplete());
        };
        if category.is_empty() {
            return Err(incomplete());
        }

        let note = self.description.trim();
        let mut logo = None;
        let description = if is_subscription {
            let service = self
                .subscription_service
                .as_deref()
                .and_then(category::subscription_service);
            logo = service.map(|s| s.logo.to_string());
            let name = service.map(|s| s.name).unwrap_or("Subscription");
            if note.is_empty() {
                name.to_string()
            } else {
                format!("{name} ({note})")
            }
        } else if note.is_empty() {
            category.clone()
        } else {
            note.to_string()
        };

        let mut new = NewTransaction::new(kind, amount, category, date).with_description(description);
        new.logo = logo;
        new.recurring = is_subscription && self.recurring;
        if is_expense {
            new.payment_method = self.payment_method;
        }

        let credit_purchase =
            is_expense && self.payment_method == Some(PaymentMethod::Credit) && !is_subscription;
        if credit_purchase && let Some(count) = self.installment_count.filter(|c| *c > 1) {
            let interest = self.interest_per_month.filter(|i| *i > Decimal::ZERO);
            new = new.with_installments(count, self.installment_mode.unwrap_or_default(), interest);
            new.first_due_date = Some(self.first_due_date.unwrap_or(date));
        }

        Ok(DraftOutcome::Create(new.validated()?))
    }
}

fn incomplete() -> FinanceError {
    FinanceError::validation("Required fields are incomplete or the amount is invalid.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    fn draft(category: &str, amount: &str) -> TransactionDraft {
        TransactionDraft {
            kind: Some(TransactionKind::Expense),
            amount: amount.into(),
            category: category.into(),
            date: Some(day()),
            ..Default::default()
        }
    }

    fn created(draft: TransactionDraft) -> NewTransaction {
        match draft.into_outcome().unwrap() {
            DraftOutcome::Create(new) => new,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_description_defaults_to_category() {
        let new = created(draft("Food", "12,50"));
        assert_eq!(new.description.as_deref(), Some("Food"));
        assert_eq!(new.amount.value(), dec!(12.50));
    }

    #[test]
    fn test_subscription_uses_catalog() {
        let mut d = draft(category::SUBSCRIPTIONS, "39.90");
        d.subscription_service = Some("netflix".into());
        d.description = "family plan".into();
        d.recurring = true;
        let new = created(d);
        assert_eq!(new.description.as_deref(), Some("Netflix (family plan)"));
        assert!(new.logo.is_some());
        assert!(new.recurring);
    }

    #[test]
    fn test_recurring_only_for_subscriptions() {
        let mut d = draft("Food", "10");
        d.recurring = true;
        assert!(!created(d).recurring);
    }

    #[test]
    fn test_income_drops_payment_method() {
        let mut d = draft("Salary", "1000");
        d.kind = Some(TransactionKind::Income);
        d.payment_method = Some(PaymentMethod::Credit);
        assert_eq!(created(d).payment_method, None);
    }

    #[test]
    fn test_installments_only_for_credit_purchases() {
        let mut d = draft("Shopping", "300");
        d.payment_method = Some(PaymentMethod::Debit);
        d.installment_count = Some(3);
        assert!(!created(d.clone()).is_installment);

        d.payment_method = Some(PaymentMethod::Credit);
        d.interest_per_month = Some(dec!(0));
        let new = created(d);
        assert!(new.is_installment);
        assert_eq!(new.installment_count, Some(3));
        assert_eq!(new.interest_per_month, None);
        assert_eq!(new.first_due_date, Some(day()));
    }

    #[test]
    fn test_bill_payment_draft_pays_the_bill() {
        let outcome = draft(category::BILL_PAYMENT, "").into_outcome().unwrap();
        assert_eq!(
            outcome,
            DraftOutcome::PayBill {
                payment_date: Some(day())
            }
        );
    }

    #[test]
    fn test_invalid_amount_is_rejected() {
        assert!(draft("Food", "abc").into_outcome().is_err());
        assert!(draft("Food", "-3").into_outcome().is_err());
        let mut no_date = draft("Food", "3");
        no_date.date = None;
        assert!(no_date.into_outcome().is_err());
    }
}
