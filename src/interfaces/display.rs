//! Plain-text rendering of the tracker for the terminal.

use crate::config::DisplayConfig;
use crate::domain::billing::{BillingInfo, FutureInstallmentGroup};
use crate::domain::money::Money;
use crate::domain::saving_box::{MovementKind, SavingBox};
use crate::domain::subscription::{SubscriptionGroup, SubscriptionOverview};
use crate::domain::suggestion::Suggestion;
use crate::domain::summary::Summary;
use crate::domain::transaction::{PaymentMethod, Transaction};
use chrono::NaiveDate;
use std::fmt::Write;

/// Formats amounts and dates according to [`DisplayConfig`].
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: DisplayConfig,
}

impl Formatter {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    /// `R$ 1.234,56` with the default configuration.
    pub fn currency(&self, money: Money) -> String {
        let rounded = money.round_cents().value();
        let digits = format!("{:.2}", rounded.abs());
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(self.config.thousands_separator);
            }
            grouped.push(digit);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!(
            "{sign}{} {grouped}{}{cents}",
            self.config.currency_symbol, self.config.decimal_separator
        )
    }

    pub fn date(&self, date: NaiveDate) -> String {
        date.format(&self.config.date_format).to_string()
    }

    /// Header of a future-installments month, e.g. `March 2024`.
    pub fn month(&self, year: i32, month: u32) -> String {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{month:02}/{year}"))
    }

    pub fn summary(&self, summary: &Summary) -> String {
        format!(
            "Balance:          {}\nIncome:           {}\nExpenses:         {}\nCredit card bill: {}\n",
            self.currency(summary.balance),
            self.currency(summary.total_income),
            self.currency(summary.total_expenses),
            self.currency(summary.credit_card_bill),
        )
    }

    pub fn transactions(&self, transactions: &[Transaction]) -> String {
        if transactions.is_empty() {
            return "No transactions recorded yet\n".to_string();
        }
        let mut out = String::new();
        for tx in transactions {
            let sign = if tx.is_income() { "+" } else { "-" };
            let badge = match tx.payment_method {
                Some(PaymentMethod::Credit) => " [credit]",
                Some(PaymentMethod::Debit) => " [debit]",
                None if tx.is_bill_payment() => " [debit]",
                None => "",
            };
            let _ = writeln!(
                out,
                "#{:<4} {}  {} • {}  {sign} {}{badge}",
                tx.id,
                tx.title(),
                tx.category,
                self.date(tx.date),
                self.currency(tx.amount.into()),
            );
        }
        out
    }

    pub fn bill(&self, bill: &BillingInfo) -> String {
        let mut out = format!(
            "Bill {:02}/{}: {}\n  One-shot purchases: {}\n  Installments:       {}\n",
            bill.month,
            bill.year,
            self.currency(bill.total),
            self.currency(bill.one_shot_total),
            self.currency(bill.installments_total),
        );
        for charge in &bill.charges {
            let _ = writeln!(
                out,
                "  - {} ({}/{}) due {}  {}",
                charge.description,
                charge.installment_number,
                charge.installments,
                self.date(charge.due_date),
                self.currency(charge.amount),
            );
        }
        out
    }

    pub fn future_installments(&self, groups: &[FutureInstallmentGroup]) -> String {
        if groups.is_empty() {
            return "No future installments\n".to_string();
        }
        let mut out = String::new();
        for group in groups {
            let _ = writeln!(
                out,
                "{}  {}",
                self.month(group.year, group.month),
                self.currency(group.total)
            );
            for item in &group.items {
                let _ = writeln!(
                    out,
                    "  {}  Installment {}/{} • due {}  {}",
                    item.description,
                    item.installment_number,
                    item.installments,
                    self.date(item.due_date),
                    self.currency(item.amount),
                );
            }
        }
        out
    }

    pub fn subscriptions(&self, overview: &SubscriptionOverview) -> String {
        if overview.is_empty() {
            return "No active subscriptions\n".to_string();
        }
        let mut out = String::new();
        self.subscription_group(&mut out, "Debit", &overview.debit);
        self.subscription_group(&mut out, "Credit", &overview.credit);
        out
    }

    fn subscription_group(&self, out: &mut String, title: &str, group: &SubscriptionGroup) {
        if group.items.is_empty() {
            return;
        }
        let _ = writeln!(out, "{title}: {} / month", self.currency(group.total));
        for tx in &group.items {
            let _ = writeln!(out, "  {}  {}", tx.label(), self.currency(tx.amount.into()));
        }
    }

    pub fn suggestions(&self, suggestions: &[Suggestion]) -> String {
        suggestions
            .iter()
            .map(|s| format!("[{}] {}\n", s.label, s.text))
            .collect()
    }

    pub fn saving_boxes(&self, boxes: &[SavingBox]) -> String {
        if boxes.is_empty() {
            return "No saving boxes yet\n".to_string();
        }
        let mut out = String::new();
        for b in boxes {
            let goal = if b.has_goal() {
                format!(" of {} ({:.0}%)", self.currency(b.goal), b.progress())
            } else {
                String::new()
            };
            let _ = writeln!(out, "#{:<4} {}  {}{goal}", b.id, b.name, self.currency(b.balance));
        }
        out
    }

    pub fn saving_box(&self, b: &SavingBox) -> String {
        let mut out = format!("{}\n", b.name);
        if let Some(description) = &b.description {
            let _ = writeln!(out, "{description}");
        }
        let _ = writeln!(out, "Balance:   {}", self.currency(b.balance));
        let _ = writeln!(out, "Total in:  {}", self.currency(b.total_in));
        let _ = writeln!(out, "Total out: {}", self.currency(b.total_out));
        if b.has_goal() {
            let _ = writeln!(
                out,
                "Goal:      {} ({:.0}%)",
                self.currency(b.goal),
                b.progress()
            );
        }
        if b.movements.is_empty() {
            out.push_str("No movements yet\n");
        }
        for m in b.movements_newest_first() {
            let sign = match m.kind {
                MovementKind::Deposit => "+",
                MovementKind::Withdraw => "-",
            };
            let _ = writeln!(
                out,
                "  {}  {}  {sign} {}",
                self.date(m.date),
                m.label(),
                self.currency(m.amount.into()),
            );
        }
        out
    }
}
