use super::money::{Amount, Money};
use crate::error::{FinanceError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    #[serde(alias = "in")]
    Deposit,
    #[serde(alias = "out")]
    Withdraw,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Movement {
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub amount: Amount,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl Movement {
    /// Description, falling back to the movement kind.
    pub fn label(&self) -> &str {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => match self.kind {
                MovementKind::Deposit => "Deposit",
                MovementKind::Withdraw => "Withdrawal",
            },
        }
    }
}

/// A named sub-account with its own deposit/withdraw ledger.
///
/// `balance`, `total_in` and `total_out` are always derived from `movements`;
/// call [`SavingBox::recompute`] after touching the ledger directly.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SavingBox {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    /// Savings target; zero means no goal was set.
    pub goal: Money,
    pub balance: Money,
    pub total_in: Money,
    pub total_out: Money,
    pub created_at: DateTime<Utc>,
    pub movements: Vec<Movement>,
}

/// Request to open a new box.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct NewSavingBox {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "goal")]
    pub target_amount: Option<Decimal>,
}

impl SavingBox {
    pub fn create(id: u64, new: NewSavingBox, created_at: DateTime<Utc>) -> Result<Self> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(FinanceError::validation("A saving box needs a name."));
        }
        let goal = match new.target_amount.filter(|target| *target > Decimal::ZERO) {
            Some(target) => Money::from(Amount::new(target)?),
            None => Money::ZERO,
        };
        Ok(Self {
            id,
            name,
            description: new
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            goal,
            balance: Money::ZERO,
            total_in: Money::ZERO,
            total_out: Money::ZERO,
            created_at,
            movements: Vec::new(),
        })
    }

    pub fn deposit(&mut self, amount: Amount, date: NaiveDate, description: Option<String>) {
        self.movements.push(Movement {
            kind: MovementKind::Deposit,
            amount,
            date,
            description,
        });
        self.recompute();
    }

    /// Withdraws from the box if the balance covers the amount.
    pub fn withdraw(
        &mut self,
        amount: Amount,
        date: NaiveDate,
        description: Option<String>,
    ) -> Result<()> {
        if Money::from(amount) > self.balance {
            return Err(FinanceError::validation(format!(
                "Insufficient balance in saving box '{}'.",
                self.name
            )));
        }
        self.movements.push(Movement {
            kind: MovementKind::Withdraw,
            amount,
            date,
            description,
        });
        self.recompute();
        Ok(())
    }

    /// Rebuilds the totals from the movement ledger.
    pub fn recompute(&mut self) {
        let (total_in, total_out) =
            self.movements
                .iter()
                .fold((Money::ZERO, Money::ZERO), |(inflow, outflow), m| match m.kind {
                    MovementKind::Deposit => (inflow + Money::from(m.amount), outflow),
                    MovementKind::Withdraw => (inflow, outflow + Money::from(m.amount)),
                });
        self.total_in = total_in;
        self.total_out = total_out;
        self.balance = total_in - total_out;
    }

    pub fn has_goal(&self) -> bool {
        self.goal.is_positive()
    }

    /// Percentage of the goal reached, capped at 100. Zero without a goal.
    pub fn progress(&self) -> Decimal {
        if !self.has_goal() {
            return Decimal::ZERO;
        }
        self.balance
            .value()
            .checked_div(self.goal.value())
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Decimal::ONE_HUNDRED, |pct| {
                pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            })
    }

    /// Movements, newest first.
    pub fn movements_newest_first(&self) -> Vec<&Movement> {
        let mut movements: Vec<&Movement> = self.movements.iter().collect();
        movements.sort_by(|a, b| b.date.cmp(&a.date));
        movements
    }
}

/// Newest box first, then by name.
pub fn sort_boxes(boxes: &mut [SavingBox]) {
    boxes.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}
