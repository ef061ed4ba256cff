use super::api::FinanceApiRef;
use super::finance::MovementRequest;
use crate::domain::billing::{BillingInfo, FutureInstallmentGroup};
use crate::domain::draft::{DraftOutcome, TransactionDraft};
use crate::domain::money::Amount;
use crate::domain::saving_box::{self, NewSavingBox, SavingBox};
use crate::domain::subscription::SubscriptionOverview;
use crate::domain::suggestion::{self, Suggestion};
use crate::domain::summary::Summary;
use crate::domain::transaction::Transaction;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Which movement a saving-box form submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementForm {
    Deposit,
    Withdraw,
}

/// Client-side state of the tracker.
///
/// Every call to the API is handled here: a failure never propagates, it
/// becomes an error [`Notice`] and the affected data falls back to empty (or,
/// for the bill, to the figure computed from the local transaction list).
pub struct Dashboard {
    api: FinanceApiRef,
    transactions: Vec<Transaction>,
    billing: Option<BillingInfo>,
    future_installments: Vec<FutureInstallmentGroup>,
    saving_boxes: Vec<SavingBox>,
    selected_box: Option<SavingBox>,
    notices: Vec<Notice>,
}

impl Dashboard {
    pub fn new(api: FinanceApiRef) -> Self {
        Self {
            api,
            transactions: Vec::new(),
            billing: None,
            future_installments: Vec::new(),
            saving_boxes: Vec::new(),
            selected_box: None,
            notices: Vec::new(),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The server's bill, if the last refresh succeeded.
    pub fn billing(&self) -> Option<&BillingInfo> {
        self.billing.as_ref()
    }

    pub fn future_installments(&self) -> &[FutureInstallmentGroup] {
        &self.future_installments
    }

    pub fn saving_boxes(&self) -> &[SavingBox] {
        &self.saving_boxes
    }

    pub fn selected_box(&self) -> Option<&SavingBox> {
        self.selected_box.as_ref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Returns and clears the pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn summary(&self) -> Summary {
        Summary::calculate(&self.transactions, self.billing.as_ref())
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        suggestion::generate(&self.summary(), &self.transactions)
    }

    pub fn subscriptions(&self) -> SubscriptionOverview {
        SubscriptionOverview::from_transactions(&self.transactions)
    }

    /// Loads transactions, the current bill and future installments.
    pub async fn load(&mut self) {
        self.reload_transactions().await;
        self.reload_billing().await;
    }

    async fn reload_transactions(&mut self) {
        match self.api.list_transactions().await {
            Ok(transactions) => self.transactions = transactions,
            Err(e) => {
                warn!("Error loading transactions: {}", e);
                self.transactions.clear();
                self.notices.push(Notice::error("Could not load transactions"));
            }
        }
    }

    /// Refreshes the bill and the future installments.
    pub async fn reload_billing(&mut self) {
        self.billing = match self.api.current_bill().await {
            Ok(bill) => Some(bill),
            Err(e) => {
                warn!("Error loading current bill: {}", e);
                None
            }
        };
        self.future_installments = match self.api.future_installments().await {
            Ok(groups) => groups,
            Err(e) => {
                warn!("Error loading future installments: {}", e);
                Vec::new()
            }
        };
    }

    /// Submits the transaction form.
    pub async fn submit(&mut self, draft: TransactionDraft) {
        let outcome = match draft.into_outcome() {
            Ok(outcome) => outcome,
            Err(e) => {
                self.notices.push(Notice::error(e.to_string()));
                return;
            }
        };

        match outcome {
            DraftOutcome::PayBill { payment_date } => self.pay_bill(payment_date).await,
            DraftOutcome::Create(new) => match self.api.create_transaction(new).await {
                Ok(saved) => {
                    self.transactions.insert(0, saved);
                    self.reload_billing().await;
                    self.notices
                        .push(Notice::success("Transaction added successfully!"));
                }
                Err(e) => self.notices.push(Notice::error(e.to_string())),
            },
        }
    }

    pub async fn pay_bill(&mut self, payment_date: Option<NaiveDate>) {
        match self.api.pay_bill(payment_date).await {
            Ok(receipt) => {
                self.reload_transactions().await;
                self.reload_billing().await;
                self.notices.push(Notice::success(format!(
                    "Bill paid successfully: {:.2}",
                    receipt.paid_amount.value()
                )));
            }
            Err(e) => self.notices.push(Notice::error(e.to_string())),
        }
    }

    pub async fn delete(&mut self, id: u64) {
        match self.api.delete_transaction(id).await {
            Ok(_) => {
                self.transactions.retain(|t| t.id != id);
                self.reload_billing().await;
                self.notices
                    .push(Notice::success("Transaction deleted successfully"));
            }
            Err(e) => self.notices.push(Notice::error(e.to_string())),
        }
    }

    pub async fn load_saving_boxes(&mut self) {
        match self.api.list_saving_boxes().await {
            Ok(boxes) => self.saving_boxes = boxes,
            Err(e) => {
                warn!("Error loading saving boxes: {}", e);
                self.saving_boxes.clear();
                self.notices.push(Notice::error("Could not load saving boxes"));
            }
        }
    }

    pub async fn select_box(&mut self, id: u64) {
        match self.api.get_saving_box(id).await {
            Ok(saving_box) => self.selected_box = Some(saving_box),
            Err(e) => {
                warn!("Error loading saving box {}: {}", id, e);
                self.notices
                    .push(Notice::error("Error loading saving box details"));
            }
        }
    }

    pub async fn create_box(&mut self, new: NewSavingBox) {
        if new.name.trim().is_empty() {
            self.notices
                .push(Notice::error("Enter a name for the saving box"));
            return;
        }
        match self.api.create_saving_box(new).await {
            Ok(created) => {
                self.saving_boxes.push(created.clone());
                saving_box::sort_boxes(&mut self.saving_boxes);
                self.selected_box = Some(created);
                self.notices
                    .push(Notice::success("Saving box created successfully!"));
            }
            Err(e) => self.notices.push(Notice::error(e.to_string())),
        }
    }

    /// Submits a deposit or withdrawal form for the selected box.
    pub async fn move_money(
        &mut self,
        form: MovementForm,
        amount: &str,
        date: Option<NaiveDate>,
        description: &str,
    ) {
        let Some(id) = self.selected_box.as_ref().map(|b| b.id) else {
            self.notices
                .push(Notice::error("Select a saving box first"));
            return;
        };
        let (Ok(amount), Some(date)) = (Amount::parse(amount), date) else {
            self.notices
                .push(Notice::error("Enter a valid amount and date"));
            return;
        };

        let request = MovementRequest {
            amount,
            date: Some(date),
            description: Some(description.trim().to_string()).filter(|d| !d.is_empty()),
        };
        let result = match form {
            MovementForm::Deposit => self.api.deposit(id, request).await,
            MovementForm::Withdraw => self.api.withdraw(id, request).await,
        };

        match result {
            Ok(receipt) => {
                let updated = receipt.saving_box;
                if let Some(slot) = self.saving_boxes.iter_mut().find(|b| b.id == updated.id) {
                    *slot = updated.clone();
                }
                self.selected_box = Some(updated);
                self.transactions.insert(0, receipt.transaction);
                self.notices.push(Notice::success(match form {
                    MovementForm::Deposit => "Deposit recorded successfully!",
                    MovementForm::Withdraw => {
                        "Withdrawal recorded successfully! It shows up as 'Saving Box Withdrawal' in the transactions."
                    }
                }));
            }
            Err(e) => self.notices.push(Notice::error(e.to_string())),
        }
    }
}
