//! Advisory messages derived from the summary and the transaction list.

use super::money::Money;
use super::summary::Summary;
use super::transaction::Transaction;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

const TOP_CATEGORY_SHARE: Decimal = dec!(0.3);
const SPENDING_SHARE: Decimal = dec!(0.8);
const SAVINGS_SHARE: Decimal = dec!(0.3);
const BILL_SHARE: Decimal = dec!(0.5);
const MAX_SUBSCRIPTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Info,
    Warning,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub label: &'static str,
    pub text: String,
}

impl Suggestion {
    fn new(kind: SuggestionKind, label: &'static str, text: impl Into<String>) -> Self {
        Self {
            kind,
            label,
            text: text.into(),
        }
    }
}

pub fn generate(summary: &Summary, transactions: &[Transaction]) -> Vec<Suggestion> {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|t| t.is_expense()).collect();
    if expenses.is_empty() {
        return vec![Suggestion::new(
            SuggestionKind::Info,
            "Tip",
            "Start recording your expenses to receive personalized suggestions.",
        )];
    }

    let mut suggestions = Vec::new();
    let income = summary.total_income;

    if let Some((category, spent)) = top_category(&expenses)
        && spent.exceeds_share_of(income, TOP_CATEGORY_SHARE)
    {
        suggestions.push(Suggestion::new(
            SuggestionKind::Warning,
            "Attention",
            format!(
                "Your spending on {category} is more than 30% of your income. Consider cutting back in this category."
            ),
        ));
    }

    if summary.total_expenses.exceeds_share_of(income, SPENDING_SHARE) {
        suggestions.push(Suggestion::new(
            SuggestionKind::Warning,
            "Alert",
            "You are spending more than 80% of your income. Try to save more to build an emergency fund.",
        ));
    } else if summary.balance.exceeds_share_of(income, SAVINGS_SHARE) {
        suggestions.push(Suggestion::new(
            SuggestionKind::Success,
            "Well done",
            "You are saving more than 30% of your income! Keep tracking your spending!",
        ));
    }

    let subscriptions = expenses.iter().filter(|t| t.is_subscription()).count();
    if subscriptions > MAX_SUBSCRIPTIONS {
        suggestions.push(Suggestion::new(
            SuggestionKind::Info,
            "Tip",
            format!(
                "You have {subscriptions} active subscriptions. Review which ones you really use and consider cancelling the non-essential ones."
            ),
        ));
    }

    if summary.credit_card_bill.exceeds_share_of(income, BILL_SHARE) {
        suggestions.push(Suggestion::new(
            SuggestionKind::Warning,
            "Attention",
            "Your credit-card bill is high. Pay it as soon as possible to avoid interest and prefer debit.",
        ));
    }

    if suggestions.is_empty() {
        suggestions.push(Suggestion::new(
            SuggestionKind::Success,
            "All good",
            "Your finances are balanced. Keep it up!",
        ));
    }
    suggestions
}

/// Category with the largest spend, in first-seen order; ties go to the later one.
fn top_category<'a>(expenses: &[&'a Transaction]) -> Option<(&'a str, Money)> {
    let mut totals: Vec<(&'a str, Money)> = Vec::new();
    for tx in expenses {
        match totals.iter_mut().find(|(name, _)| *name == tx.category) {
            Some((_, total)) => *total += tx.amount.into(),
            None => totals.push((tx.category.as_str(), tx.amount.into())),
        }
    }
    totals
        .into_iter()
        .reduce(|best, next| if best.1 > next.1 { best } else { next })
}
