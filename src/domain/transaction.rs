use super::category;
use super::installment::{InstallmentPlan, MAX_INSTALLMENTS, MAX_INTEREST_PER_MONTH};
use super::money::Amount;
use crate::error::{FinanceError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Debit,
    Credit,
}

/// How the amount of an installment purchase is read.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentMode {
    /// `amount` is the purchase price, split over the installments.
    #[default]
    Total,
    /// `amount` is the value of each installment.
    PerInstallment,
}

/// A transaction as submitted for creation, before it gets an id.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Amount,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub is_installment: bool,
    #[serde(default)]
    pub installment_count: Option<u32>,
    #[serde(default)]
    pub installment_mode: Option<InstallmentMode>,
    #[serde(default)]
    pub interest_per_month: Option<Decimal>,
    #[serde(default)]
    pub first_due_date: Option<NaiveDate>,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        amount: Amount,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            amount,
            category: category.into(),
            description: None,
            date,
            payment_method: None,
            recurring: false,
            logo: None,
            is_installment: false,
            installment_count: None,
            installment_mode: None,
            interest_per_month: None,
            first_due_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    pub fn with_installments(
        mut self,
        count: u32,
        mode: InstallmentMode,
        interest_per_month: Option<Decimal>,
    ) -> Self {
        self.is_installment = true;
        self.installment_count = Some(count);
        self.installment_mode = Some(mode);
        self.interest_per_month = interest_per_month;
        self
    }

    /// Normalizes optional fields and enforces the creation invariants.
    pub fn validated(mut self) -> Result<Self> {
        self.category = self.category.trim().to_string();
        if self.category.is_empty() {
            return Err(FinanceError::validation("The field 'category' is required."));
        }
        self.description = non_blank(self.description);
        self.logo = non_blank(self.logo);

        if self.kind == TransactionKind::Income {
            self.payment_method = None;
        }

        if !self.is_installment {
            self.installment_count = None;
            self.installment_mode = None;
            self.interest_per_month = None;
            self.first_due_date = None;
            return Ok(self);
        }

        match self.installment_count {
            Some(count) if count > MAX_INSTALLMENTS => {
                return Err(FinanceError::validation(format!(
                    "An installment purchase cannot exceed {MAX_INSTALLMENTS} installments."
                )));
            }
            Some(count) if count > 1 => {}
            _ => {
                return Err(FinanceError::validation(
                    "An installment purchase needs more than one installment.",
                ));
            }
        }
        if self.kind != TransactionKind::Expense
            || self.payment_method != Some(PaymentMethod::Credit)
        {
            return Err(FinanceError::validation(
                "Installments are only available for credit expenses.",
            ));
        }
        if let Some(interest) = self.interest_per_month
            && interest < Decimal::ZERO
        {
            return Err(FinanceError::validation(
                "Interest per month cannot be negative.",
            ));
        }
        if let Some(interest) = self.interest_per_month
            && interest > MAX_INTEREST_PER_MONTH
        {
            return Err(FinanceError::validation(format!(
                "Interest per month cannot exceed {MAX_INTEREST_PER_MONTH}%."
            )));
        }
        self.interest_per_month = self.interest_per_month.filter(|i| *i > Decimal::ZERO);
        self.installment_mode = Some(self.installment_mode.unwrap_or_default());
        self.first_due_date = Some(self.first_due_date.unwrap_or(self.date));
        Ok(self)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A recorded income or expense. Immutable once created, except for deletion.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Amount,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub payment_method: Option<PaymentMethod>,
    pub recurring: bool,
    pub logo: Option<String>,
    pub is_installment: bool,
    pub installment_count: Option<u32>,
    pub installment_mode: Option<InstallmentMode>,
    pub interest_per_month: Option<Decimal>,
    pub first_due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn from_new(id: u64, new: NewTransaction, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: new.kind,
            amount: new.amount,
            category: new.category,
            description: new.description,
            date: new.date,
            payment_method: new.payment_method,
            recurring: new.recurring,
            logo: new.logo,
            is_installment: new.is_installment,
            installment_count: new.installment_count,
            installment_mode: new.installment_mode,
            interest_per_month: new.interest_per_month,
            first_due_date: new.first_due_date,
            created_at,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_bill_payment(&self) -> bool {
        self.is_expense() && self.category == category::BILL_PAYMENT
    }

    /// Expenses that leave the cash balance right away.
    pub fn is_cash_outflow(&self) -> bool {
        self.is_expense()
            && (self.payment_method != Some(PaymentMethod::Credit) || self.is_bill_payment())
    }

    /// Expenses that accrue on the credit-card bill.
    pub fn is_credit_expense(&self) -> bool {
        self.is_expense()
            && self.payment_method == Some(PaymentMethod::Credit)
            && !self.is_bill_payment()
    }

    pub fn is_subscription(&self) -> bool {
        self.is_expense() && self.category == category::SUBSCRIPTIONS && self.recurring
    }

    /// The amortization plan, if this is a credit purchase split in installments.
    pub fn installment_plan(&self) -> Option<InstallmentPlan> {
        if !self.is_installment || !self.is_credit_expense() {
            return None;
        }
        let count = self.installment_count.filter(|c| *c > 1)?;
        Some(InstallmentPlan {
            count: count.min(MAX_INSTALLMENTS),
            mode: self.installment_mode.unwrap_or_default(),
            interest_per_month: self.interest_per_month,
            first_due_date: self.first_due_date.unwrap_or(self.date),
        })
    }

    /// Description, falling back to the category.
    pub fn label(&self) -> &str {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.category)
    }

    /// Display title; installment purchases carry an `(Nx)` suffix.
    pub fn title(&self) -> String {
        match self.installment_plan() {
            Some(plan) => format!("{} ({}x)", self.label(), plan.count),
            None => self.label().to_string(),
        }
    }
}

/// Newest date first, then most recently created.
pub fn newest_first(a: &Transaction, b: &Transaction) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(amount: Decimal) -> NewTransaction {
        NewTransaction::new(
            TransactionKind::Expense,
            Amount::new(amount).unwrap(),
            "Food",
            date(2024, 3, 10),
        )
    }

    #[test]
    fn test_deserialize_from_api_payload() {
        let json = r#"{
            "type": "expense",
            "amount": 120.5,
            "category": "Shopping",
            "description": "Shoes",
            "date": "2024-03-10",
            "payment_method": "credit",
            "is_installment": true,
            "installment_count": 3,
            "installment_mode": "per_installment"
        }"#;
        let new: NewTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(new.kind, TransactionKind::Expense);
        assert_eq!(new.amount.value(), dec!(120.5));
        assert_eq!(new.installment_mode, Some(InstallmentMode::PerInstallment));
        assert!(!new.recurring);
    }

    #[test]
    fn test_validated_requires_category() {
        let mut new = expense(dec!(10));
        new.category = "   ".into();
        assert!(matches!(
            new.validated(),
            Err(FinanceError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validated_clears_installment_fields_when_not_installment() {
        let mut new = expense(dec!(10));
        new.installment_count = Some(4);
        new.interest_per_month = Some(dec!(2));
        let new = new.validated().unwrap();
        assert_eq!(new.installment_count, None);
        assert_eq!(new.interest_per_month, None);
    }

    #[test]
    fn test_validated_rejects_single_installment() {
        let new = expense(dec!(10))
            .with_payment_method(PaymentMethod::Credit)
            .with_installments(1, InstallmentMode::Total, None);
        assert!(new.validated().is_err());
    }

    #[test]
    fn test_validated_rejects_installments_on_debit() {
        let new = expense(dec!(10))
            .with_payment_method(PaymentMethod::Debit)
            .with_installments(3, InstallmentMode::Total, None);
        assert!(new.validated().is_err());
    }

    #[test]
    fn test_validated_bounds_installment_count_and_interest() {
        let credit = || expense(dec!(1000)).with_payment_method(PaymentMethod::Credit);

        let longest = credit()
            .with_installments(MAX_INSTALLMENTS, InstallmentMode::Total, Some(dec!(100)))
            .validated();
        assert!(longest.is_ok());

        let too_long = credit()
            .with_installments(MAX_INSTALLMENTS + 1, InstallmentMode::Total, None)
            .validated();
        assert!(matches!(too_long, Err(FinanceError::ValidationError(_))));

        let usurious = credit()
            .with_installments(12, InstallmentMode::Total, Some(dec!(100.01)))
            .validated();
        assert!(matches!(usurious, Err(FinanceError::ValidationError(_))));
    }

    #[test]
    fn test_installment_plan_clamps_stored_count() {
        let mut new = expense(dec!(10)).with_payment_method(PaymentMethod::Credit);
        new = new.with_installments(u32::MAX, InstallmentMode::Total, None);
        let tx = Transaction::from_new(1, new, Utc::now());
        assert_eq!(tx.installment_plan().unwrap().count, MAX_INSTALLMENTS);
    }

    #[test]
    fn test_validated_defaults_first_due_date_to_purchase_date() {
        let new = expense(dec!(300))
            .with_payment_method(PaymentMethod::Credit)
            .with_installments(3, InstallmentMode::Total, Some(dec!(0)))
            .validated()
            .unwrap();
        assert_eq!(new.first_due_date, Some(date(2024, 3, 10)));
        assert_eq!(new.interest_per_month, None);
    }

    #[test]
    fn test_cash_and_credit_classification() {
        let now = Utc::now();
        let debit = Transaction::from_new(
            1,
            expense(dec!(10)).with_payment_method(PaymentMethod::Debit),
            now,
        );
        let unspecified = Transaction::from_new(2, expense(dec!(10)), now);
        let credit = Transaction::from_new(
            3,
            expense(dec!(10)).with_payment_method(PaymentMethod::Credit),
            now,
        );
        let mut bill = expense(dec!(10)).with_payment_method(PaymentMethod::Credit);
        bill.category = category::BILL_PAYMENT.into();
        let bill = Transaction::from_new(4, bill, now);

        assert!(debit.is_cash_outflow() && !debit.is_credit_expense());
        assert!(unspecified.is_cash_outflow());
        assert!(credit.is_credit_expense() && !credit.is_cash_outflow());
        assert!(bill.is_cash_outflow() && !bill.is_credit_expense());
    }

    #[test]
    fn test_title_marks_installments() {
        let new = expense(dec!(300))
            .with_description("TV")
            .with_payment_method(PaymentMethod::Credit)
            .with_installments(10, InstallmentMode::Total, None)
            .validated()
            .unwrap();
        let tx = Transaction::from_new(1, new, Utc::now());
        assert_eq!(tx.title(), "TV (10x)");
    }
}
