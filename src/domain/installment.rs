//! Amortization of credit purchases into monthly charges.

use super::money::{Amount, Money};
use super::transaction::{InstallmentMode, Transaction};
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Longest installment plan accepted (30 years of monthly charges).
pub const MAX_INSTALLMENTS: u32 = 360;

/// Highest monthly interest accepted, in percent.
pub const MAX_INTEREST_PER_MONTH: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentPlan {
    pub count: u32,
    pub mode: InstallmentMode,
    /// Monthly interest in percent (`1.99` means 1.99% a month).
    pub interest_per_month: Option<Decimal>,
    pub first_due_date: NaiveDate,
}

impl InstallmentPlan {
    /// Due date of installment `number` (1-based). Days past the end of a
    /// shorter month are clamped to its last day.
    pub fn due_date(&self, number: u32) -> NaiveDate {
        let offset = Months::new(number.saturating_sub(1));
        self.first_due_date
            .checked_add_months(offset)
            .unwrap_or(self.first_due_date)
    }

    /// Splits `amount` into one value per installment.
    pub fn amounts(&self, amount: Amount) -> Vec<Money> {
        let count = self.count.max(1);
        let value = Money::from(amount);
        match self.mode {
            InstallmentMode::PerInstallment => vec![value; count as usize],
            InstallmentMode::Total => match self
                .monthly_rate()
                .and_then(|rate| fixed_payment(value.value(), rate, count))
            {
                Some(payment) => vec![Money::new(payment).round_cents(); count as usize],
                None => split_evenly(value, count),
            },
        }
    }

    /// Interest as a fraction; `None` when it rounds to nothing.
    fn monthly_rate(&self) -> Option<Decimal> {
        self.interest_per_month
            .and_then(|i| i.checked_div(HUNDRED))
            .filter(|rate| *rate > Decimal::ZERO)
    }
}

/// Price-table payment: `p * r / (1 - (1 + r)^-n)`.
///
/// `None` when the rate is too small to move the discount factor; the caller
/// then splits the principal evenly.
fn fixed_payment(principal: Decimal, rate: Decimal, count: u32) -> Option<Decimal> {
    let factor = Decimal::ONE.checked_div(Decimal::ONE.checked_add(rate)?)?;
    let mut discount = Decimal::ONE;
    for _ in 0..count {
        discount = discount.checked_mul(factor).unwrap_or(Decimal::ZERO);
    }
    principal
        .checked_mul(rate)?
        .checked_div(Decimal::ONE - discount)
        .filter(|payment| *payment > Decimal::ZERO)
}

fn split_evenly(total: Money, count: u32) -> Vec<Money> {
    let count = count.max(1);
    let share = Money::new(total.value() / Decimal::from(count)).round_cents();
    let mut amounts = vec![share; count as usize];
    let allotted: Money = amounts.iter().take(count as usize - 1).sum();
    if let Some(last) = amounts.last_mut() {
        *last = total - allotted;
    }
    amounts
}

/// Identifies one charge: the purchase and its installment number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChargeKey {
    pub transaction_id: u64,
    pub installment_number: u32,
}

/// One due amount of a credit purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub transaction_id: u64,
    pub description: String,
    pub installment_number: u32,
    pub installments: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
}

impl Charge {
    pub fn key(&self) -> ChargeKey {
        ChargeKey {
            transaction_id: self.transaction_id,
            installment_number: self.installment_number,
        }
    }

    pub fn is_installment(&self) -> bool {
        self.installments > 1
    }
}

/// Every charge a transaction puts on the credit card.
///
/// Non-credit transactions yield nothing; one-shot credit purchases yield a
/// single charge due on the purchase date.
pub fn charges_for(tx: &Transaction) -> Vec<Charge> {
    if !tx.is_credit_expense() {
        return Vec::new();
    }
    let description = tx.label().to_string();
    match tx.installment_plan() {
        None => vec![Charge {
            transaction_id: tx.id,
            description,
            installment_number: 1,
            installments: 1,
            due_date: tx.date,
            amount: tx.amount.into(),
        }],
        Some(plan) => plan
            .amounts(tx.amount)
            .into_iter()
            .zip(1..=plan.count)
            .map(|(amount, number)| Charge {
                transaction_id: tx.id,
                description: description.clone(),
                installment_number: number,
                installments: plan.count,
                due_date: plan.due_date(number),
                amount,
            })
            .collect(),
    }
}
