//! Credit-card bill and future installment projections.
//!
//! Cycles follow calendar months. A charge belongs to the current bill when it
//! is still unpaid and falls due on or before the last day of the current
//! cycle, so overdue charges roll forward until a payment settles them.

use super::installment::{Charge, ChargeKey, charges_for};
use super::money::Money;
use super::transaction::Transaction;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillingCycle {
    pub year: i32,
    pub month: u32,
}

impl BillingCycle {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first)
    }
}

/// The bill of the current cycle, derived from open charges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingInfo {
    pub year: i32,
    pub month: u32,
    pub total: Money,
    pub one_shot_total: Money,
    pub installments_total: Money,
    #[serde(default)]
    pub charges: Vec<Charge>,
}

impl BillingInfo {
    pub fn empty(cycle: BillingCycle) -> Self {
        Self {
            year: cycle.year,
            month: cycle.month,
            total: Money::ZERO,
            one_shot_total: Money::ZERO,
            installments_total: Money::ZERO,
            charges: Vec::new(),
        }
    }

    pub fn cycle(&self) -> BillingCycle {
        BillingCycle {
            year: self.year,
            month: self.month,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.total.is_positive()
    }
}

/// Settlement of a bill: the charges it covered are no longer open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillPayment {
    pub id: u64,
    /// The "Bill Payment" expense recorded for this settlement.
    pub transaction_id: u64,
    pub paid_on: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub amount: Money,
    pub charges: Vec<ChargeKey>,
}

/// Installments due in one future month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureInstallmentGroup {
    pub year: i32,
    pub month: u32,
    pub total: Money,
    pub items: Vec<Charge>,
}

/// All credit charges not yet settled by a bill payment.
pub fn open_charges(transactions: &[Transaction], payments: &[BillPayment]) -> Vec<Charge> {
    let paid: HashSet<ChargeKey> = payments
        .iter()
        .flat_map(|p| p.charges.iter().copied())
        .collect();
    let mut charges: Vec<Charge> = transactions
        .iter()
        .flat_map(charges_for)
        .filter(|c| !paid.contains(&c.key()))
        .collect();
    charges.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.key().cmp(&b.key()))
    });
    charges
}

pub fn current_bill(
    transactions: &[Transaction],
    payments: &[BillPayment],
    today: NaiveDate,
) -> BillingInfo {
    let cycle = BillingCycle::containing(today);
    let closing = cycle.last_day();
    let mut bill = BillingInfo::empty(cycle);
    for charge in open_charges(transactions, payments)
        .into_iter()
        .filter(|c| c.due_date <= closing)
    {
        if charge.is_installment() {
            bill.installments_total += charge.amount;
        } else {
            bill.one_shot_total += charge.amount;
        }
        bill.total += charge.amount;
        bill.charges.push(charge);
    }
    bill
}

pub fn future_installments(
    transactions: &[Transaction],
    payments: &[BillPayment],
    today: NaiveDate,
) -> Vec<FutureInstallmentGroup> {
    let closing = BillingCycle::containing(today).last_day();
    let mut groups: BTreeMap<BillingCycle, FutureInstallmentGroup> = BTreeMap::new();
    for charge in open_charges(transactions, payments)
        .into_iter()
        .filter(|c| c.is_installment() && c.due_date > closing)
    {
        let cycle = BillingCycle::containing(charge.due_date);
        let group = groups
            .entry(cycle)
            .or_insert_with(|| FutureInstallmentGroup {
                year: cycle.year,
                month: cycle.month,
                total: Money::ZERO,
                items: Vec::new(),
            });
        group.total += charge.amount;
        group.items.push(charge);
    }
    groups.into_values().collect()
}
