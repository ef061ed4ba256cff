use super::money::Money;
use super::transaction::{PaymentMethod, Transaction};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SubscriptionGroup {
    /// Monthly total of the group.
    pub total: Money,
    pub items: Vec<Transaction>,
}

/// Active subscriptions split by how they are paid.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SubscriptionOverview {
    pub debit: SubscriptionGroup,
    pub credit: SubscriptionGroup,
}

impl SubscriptionOverview {
    /// Keeps the most recent recurring "Subscriptions" expense per description.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut latest: HashMap<&str, &Transaction> = HashMap::new();
        for tx in transactions.iter().filter(|t| t.is_subscription()) {
            let key = tx.label();
            match latest.get(key) {
                Some(current) if !is_newer(tx, current) => {}
                _ => {
                    latest.insert(key, tx);
                }
            }
        }

        let mut active: Vec<&Transaction> = latest.into_values().collect();
        active.sort_by(|a, b| a.label().cmp(b.label()));

        let mut overview = Self::default();
        for tx in active {
            let group = match tx.payment_method {
                Some(PaymentMethod::Credit) => &mut overview.credit,
                _ => &mut overview.debit,
            };
            group.total += tx.amount.into();
            group.items.push(tx.clone());
        }
        overview
    }

    pub fn is_empty(&self) -> bool {
        self.debit.items.is_empty() && self.credit.items.is_empty()
    }

    pub fn monthly_total(&self) -> Money {
        self.debit.total + self.credit.total
    }
}

fn is_newer(candidate: &Transaction, current: &Transaction) -> bool {
    (candidate.created_at, candidate.date) > (current.created_at, current.date)
}
