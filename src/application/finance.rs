use crate::domain::billing::{self, BillPayment, BillingInfo, FutureInstallmentGroup};
use crate::domain::category;
use crate::domain::installment::Charge;
use crate::domain::money::{Amount, Money};
use crate::domain::ports::{BillPaymentStoreBox, ClockBox, SavingBoxStoreBox, TransactionStoreBox};
use crate::domain::saving_box::{self, MovementKind, NewSavingBox, SavingBox};
use crate::domain::subscription::SubscriptionOverview;
use crate::domain::suggestion::{self, Suggestion};
use crate::domain::summary::Summary;
use crate::domain::transaction::{
    NewTransaction, PaymentMethod, Transaction, TransactionKind, newest_first,
};
use crate::error::{FinanceError, Result};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::in_memory::{
    InMemoryBillPaymentStore, InMemorySavingBoxStore, InMemoryTransactionStore,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of settling the current bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillPaymentReceipt {
    pub paid_amount: Money,
    /// The "Bill Payment" expense that took the money out of the balance.
    pub transaction: Transaction,
    pub payment: BillPayment,
}

/// A deposit or withdrawal request for a saving box.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementRequest {
    pub amount: Amount,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl MovementRequest {
    pub fn new(amount: Amount) -> Self {
        Self {
            amount,
            date: None,
            description: None,
        }
    }
}

/// The updated box and the cash transaction that mirrors the movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementReceipt {
    #[serde(rename = "box")]
    pub saving_box: SavingBox,
    pub transaction: Transaction,
}

/// Everything the dashboard header shows, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub summary: Summary,
    pub billing: BillingInfo,
    pub subscriptions: SubscriptionOverview,
    pub suggestions: Vec<Suggestion>,
}

/// The operations behind every endpoint of the tracker.
///
/// `FinanceService` owns the storage backends. Reads run concurrently; every
/// mutation takes the write lock first so read-modify-write sequences such as
/// paying the bill or moving money in a box see a consistent state.
pub struct FinanceService {
    transactions: TransactionStoreBox,
    saving_boxes: SavingBoxStoreBox,
    bill_payments: BillPaymentStoreBox,
    clock: ClockBox,
    writes: Mutex<()>,
}

impl FinanceService {
    pub fn new(
        transactions: TransactionStoreBox,
        saving_boxes: SavingBoxStoreBox,
        bill_payments: BillPaymentStoreBox,
        clock: ClockBox,
    ) -> Self {
        Self {
            transactions,
            saving_boxes,
            bill_payments,
            clock,
            writes: Mutex::new(()),
        }
    }

    /// A service over fresh in-memory stores and the system clock.
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(InMemoryTransactionStore::new()),
            Box::new(InMemorySavingBoxStore::new()),
            Box::new(InMemoryBillPaymentStore::new()),
            Box::new(SystemClock),
        )
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// All transactions, newest first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let mut transactions = self.transactions.all().await?;
        transactions.sort_by(newest_first);
        Ok(transactions)
    }

    pub async fn get_transaction(&self, id: u64) -> Result<Transaction> {
        self.transactions
            .get(id)
            .await?
            .ok_or_else(|| FinanceError::not_found("Transaction", id))
    }

    pub async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction> {
        let new = new.validated()?;
        let _guard = self.writes.lock().await;
        self.insert_transaction(new).await
    }

    async fn insert_transaction(&self, new: NewTransaction) -> Result<Transaction> {
        let id = self.transactions.next_id().await?;
        let tx = Transaction::from_new(id, new, self.clock.now());
        self.transactions.store(tx.clone()).await?;
        info!(
            id = tx.id,
            kind = ?tx.kind,
            amount = %tx.amount,
            category = %tx.category,
            "Transaction created"
        );
        Ok(tx)
    }

    /// Deletes a transaction. Removing a bill payment reopens the charges it settled.
    pub async fn delete_transaction(&self, id: u64) -> Result<Transaction> {
        let _guard = self.writes.lock().await;
        let tx = self
            .transactions
            .remove(id)
            .await?
            .ok_or_else(|| FinanceError::not_found("Transaction", id))?;
        if tx.is_bill_payment()
            && let Some(payment) = self.bill_payments.remove_by_transaction(id).await?
        {
            info!(
                payment = payment.id,
                charges = payment.charges.len(),
                "Bill settlement reverted"
            );
        }
        info!(id, "Transaction deleted");
        Ok(tx)
    }

    async fn snapshot(&self) -> Result<(Vec<Transaction>, Vec<BillPayment>)> {
        Ok((
            self.transactions.all().await?,
            self.bill_payments.all().await?,
        ))
    }

    pub async fn current_bill(&self) -> Result<BillingInfo> {
        let (transactions, payments) = self.snapshot().await?;
        let bill = billing::current_bill(&transactions, &payments, self.today());
        debug!(total = %bill.total, charges = bill.charges.len(), "Current bill computed");
        Ok(bill)
    }

    pub async fn future_installments(&self) -> Result<Vec<FutureInstallmentGroup>> {
        let (transactions, payments) = self.snapshot().await?;
        Ok(billing::future_installments(
            &transactions,
            &payments,
            self.today(),
        ))
    }

    /// Settles every open charge of the current bill.
    ///
    /// Records a debit "Bill Payment" expense dated `payment_date` (today by
    /// default) for the bill total.
    pub async fn pay_bill(&self, payment_date: Option<NaiveDate>) -> Result<BillPaymentReceipt> {
        let _guard = self.writes.lock().await;
        let (transactions, payments) = self.snapshot().await?;
        let today = self.today();
        let bill = billing::current_bill(&transactions, &payments, today);
        if bill.is_empty() {
            return Err(FinanceError::validation("There is no open bill to pay."));
        }

        let paid_on = payment_date.unwrap_or(today);
        let amount = Amount::new(bill.total.value())?;
        let new = NewTransaction::new(
            TransactionKind::Expense,
            amount,
            category::BILL_PAYMENT,
            paid_on,
        )
        .with_description(format!(
            "Credit card bill {:02}/{}",
            bill.month, bill.year
        ))
        .with_payment_method(PaymentMethod::Debit);
        let payment_id = self.bill_payments.next_id().await?;
        let transaction = self.insert_transaction(new).await?;

        let payment = BillPayment {
            id: payment_id,
            transaction_id: transaction.id,
            paid_on,
            year: bill.year,
            month: bill.month,
            amount: bill.total,
            charges: bill.charges.iter().map(Charge::key).collect(),
        };
        if let Err(e) = self.bill_payments.store(payment.clone()).await {
            warn!(transaction = transaction.id, "Bill settlement failed, reverting payment: {}", e);
            self.transactions.remove(transaction.id).await?;
            return Err(e);
        }
        info!(
            amount = %bill.total,
            charges = payment.charges.len(),
            "Credit card bill paid"
        );

        Ok(BillPaymentReceipt {
            paid_amount: bill.total,
            transaction,
            payment,
        })
    }

    pub async fn summary(&self) -> Result<Summary> {
        Ok(self.overview().await?.summary)
    }

    pub async fn overview(&self) -> Result<Overview> {
        let (transactions, payments) = self.snapshot().await?;
        let billing = billing::current_bill(&transactions, &payments, self.today());
        let summary = Summary::calculate(&transactions, Some(&billing));
        Ok(Overview {
            summary,
            subscriptions: SubscriptionOverview::from_transactions(&transactions),
            suggestions: suggestion::generate(&summary, &transactions),
            billing,
        })
    }

    /// Saving boxes, newest first.
    pub async fn list_saving_boxes(&self) -> Result<Vec<SavingBox>> {
        let mut boxes = self.saving_boxes.all().await?;
        saving_box::sort_boxes(&mut boxes);
        Ok(boxes)
    }

    pub async fn create_saving_box(&self, new: NewSavingBox) -> Result<SavingBox> {
        let _guard = self.writes.lock().await;
        let id = self.saving_boxes.next_id().await?;
        let saving_box = SavingBox::create(id, new, self.clock.now())?;
        self.saving_boxes.store(saving_box.clone()).await?;
        info!(id, name = %saving_box.name, goal = %saving_box.goal, "Saving box created");
        Ok(saving_box)
    }

    pub async fn get_saving_box(&self, id: u64) -> Result<SavingBox> {
        self.saving_boxes
            .get(id)
            .await?
            .ok_or_else(|| FinanceError::not_found("Saving box", id))
    }

    pub async fn deposit(&self, id: u64, request: MovementRequest) -> Result<MovementReceipt> {
        self.move_money(id, MovementKind::Deposit, request).await
    }

    pub async fn withdraw(&self, id: u64, request: MovementRequest) -> Result<MovementReceipt> {
        self.move_money(id, MovementKind::Withdraw, request).await
    }

    async fn move_money(
        &self,
        id: u64,
        kind: MovementKind,
        request: MovementRequest,
    ) -> Result<MovementReceipt> {
        let _guard = self.writes.lock().await;
        let mut saving_box = self.get_saving_box(id).await?;
        let date = request.date.unwrap_or_else(|| self.today());
        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let mirror = match kind {
            MovementKind::Deposit => {
                saving_box.deposit(request.amount, date, description.clone());
                NewTransaction::new(
                    TransactionKind::Expense,
                    request.amount,
                    category::SAVING_BOX_DEPOSIT,
                    date,
                )
                .with_payment_method(PaymentMethod::Debit)
                .with_description(format!("Deposit to {}", saving_box.name))
            }
            MovementKind::Withdraw => {
                saving_box.withdraw(request.amount, date, description.clone())?;
                NewTransaction::new(
                    TransactionKind::Income,
                    request.amount,
                    category::SAVING_BOX_WITHDRAWAL,
                    date,
                )
                .with_description(format!("Withdrawal from {}", saving_box.name))
            }
        };

        self.saving_boxes.store(saving_box.clone()).await?;
        let transaction = self.insert_transaction(mirror).await?;
        info!(
            id,
            kind = ?kind,
            amount = %request.amount,
            balance = %saving_box.balance,
            "Saving box updated"
        );
        Ok(MovementReceipt {
            saving_box,
            transaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::BillPaymentStore;
    use crate::domain::transaction::InstallmentMode;
    use crate::infrastructure::clock::FixedClock;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service_on(today: NaiveDate) -> FinanceService {
        FinanceService::new(
            Box::new(InMemoryTransactionStore::new()),
            Box::new(InMemorySavingBoxStore::new()),
            Box::new(InMemoryBillPaymentStore::new()),
            Box::new(FixedClock::new(today)),
        )
    }

    fn amount(value: Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    fn income(value: Decimal, on: NaiveDate) -> NewTransaction {
        NewTransaction::new(TransactionKind::Income, amount(value), "Salary", on)
    }

    fn credit(value: Decimal, on: NaiveDate) -> NewTransaction {
        NewTransaction::new(TransactionKind::Expense, amount(value), "Shopping", on)
            .with_payment_method(PaymentMethod::Credit)
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let service = service_on(date(2024, 3, 31));
        service
            .create_transaction(income(dec!(10), date(2024, 3, 1)))
            .await
            .unwrap();
        service
            .create_transaction(income(dec!(20), date(2024, 3, 9)))
            .await
            .unwrap();
        service
            .create_transaction(income(dec!(30), date(2024, 3, 9)))
            .await
            .unwrap();

        let ids: Vec<u64> = service
            .list_transactions()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_installments() {
        let service = service_on(date(2024, 3, 31));
        let new = credit(dec!(100), date(2024, 3, 1))
            .with_payment_method(PaymentMethod::Debit)
            .with_installments(3, InstallmentMode::Total, None);
        let result = service.create_transaction(new).await;
        assert!(matches!(result, Err(FinanceError::ValidationError(_))));
        assert!(service.list_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_transaction() {
        let service = service_on(date(2024, 3, 31));
        let result = service.delete_transaction(42).await;
        assert!(matches!(result, Err(FinanceError::NotFound { id: 42, .. })));
    }

    #[tokio::test]
    async fn test_pay_bill_settles_charges_and_moves_balance() {
        let service = service_on(date(2024, 3, 20));
        service
            .create_transaction(income(dec!(1000), date(2024, 3, 1)))
            .await
            .unwrap();
        service
            .create_transaction(credit(dec!(250), date(2024, 3, 5)))
            .await
            .unwrap();

        let before = service.summary().await.unwrap();
        assert_eq!(before.credit_card_bill, Money::new(dec!(250)));
        assert_eq!(before.balance, Money::new(dec!(1000)));

        let receipt = service.pay_bill(None).await.unwrap();
        assert_eq!(receipt.paid_amount, Money::new(dec!(250)));
        assert_eq!(receipt.transaction.date, date(2024, 3, 20));
        assert!(receipt.transaction.is_bill_payment());

        let after = service.summary().await.unwrap();
        assert_eq!(after.credit_card_bill, Money::ZERO);
        assert_eq!(after.balance, Money::new(dec!(750)));

        let again = service.pay_bill(None).await;
        assert!(matches!(again, Err(FinanceError::ValidationError(_))));
    }

    struct UnwritablePayments;

    #[async_trait::async_trait]
    impl BillPaymentStore for UnwritablePayments {
        async fn next_id(&self) -> Result<u64> {
            Ok(1)
        }
        async fn store(&self, _payment: BillPayment) -> Result<()> {
            Err(FinanceError::IoError(std::io::Error::other("disk full")))
        }
        async fn get(&self, _id: u64) -> Result<Option<BillPayment>> {
            Ok(None)
        }
        async fn remove(&self, _id: u64) -> Result<Option<BillPayment>> {
            Ok(None)
        }
        async fn all(&self) -> Result<Vec<BillPayment>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_failed_settlement_leaves_no_payment_behind() {
        let service = FinanceService::new(
            Box::new(InMemoryTransactionStore::new()),
            Box::new(InMemorySavingBoxStore::new()),
            Box::new(UnwritablePayments),
            Box::new(FixedClock::new(date(2024, 3, 20))),
        );
        service
            .create_transaction(credit(dec!(80), date(2024, 3, 5)))
            .await
            .unwrap();

        let result = service.pay_bill(None).await;
        assert!(matches!(result, Err(FinanceError::IoError(_))));

        let transactions = service.list_transactions().await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert!(!transactions[0].is_bill_payment());
        assert_eq!(service.summary().await.unwrap().balance, Money::ZERO);
        assert_eq!(
            service.current_bill().await.unwrap().total,
            Money::new(dec!(80))
        );
    }

    #[tokio::test]
    async fn test_unbounded_installment_input_never_poisons_the_bill() {
        let service = service_on(date(2024, 3, 20));
        let tiny_interest = credit(dec!(90), date(2024, 3, 5)).with_installments(
            3,
            InstallmentMode::Total,
            Some(dec!(0.0000000000000000000000000001)),
        );
        service.create_transaction(tiny_interest).await.unwrap();

        let steep = credit(dec!(90), date(2024, 3, 5)).with_installments(
            120,
            InstallmentMode::Total,
            Some(dec!(100)),
        );
        service.create_transaction(steep).await.unwrap();

        let endless = credit(dec!(90), date(2024, 3, 5)).with_installments(
            u32::MAX,
            InstallmentMode::Total,
            None,
        );
        assert!(matches!(
            service.create_transaction(endless).await,
            Err(FinanceError::ValidationError(_))
        ));

        let bill = service.current_bill().await.unwrap();
        assert_eq!(bill.charges.len(), 2);
        assert_eq!(bill.charges[0].amount, Money::new(dec!(30)));
        assert_eq!(service.future_installments().await.unwrap().len(), 119);
        service.overview().await.unwrap();
        service.pay_bill(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_huge_amounts_are_rejected_before_storage() {
        let service = service_on(date(2024, 3, 20));
        let result = Amount::new(Decimal::MAX);
        assert!(result.is_err());

        let largest = crate::domain::money::MAX_AMOUNT;
        service
            .create_transaction(income(largest, date(2024, 3, 1)))
            .await
            .unwrap();
        service
            .create_transaction(income(largest, date(2024, 3, 2)))
            .await
            .unwrap();
        let summary = service.summary().await.unwrap();
        assert_eq!(summary.balance, Money::new(largest * dec!(2)));
    }

    #[tokio::test]
    async fn test_deleting_bill_payment_reopens_bill() {
        let service = service_on(date(2024, 3, 20));
        service
            .create_transaction(credit(dec!(80), date(2024, 3, 5)))
            .await
            .unwrap();
        let receipt = service.pay_bill(Some(date(2024, 3, 21))).await.unwrap();
        assert!(service.current_bill().await.unwrap().is_empty());

        service
            .delete_transaction(receipt.transaction.id)
            .await
            .unwrap();
        let bill = service.current_bill().await.unwrap();
        assert_eq!(bill.total, Money::new(dec!(80)));
    }

    #[tokio::test]
    async fn test_installments_spread_over_future_months() {
        let service = service_on(date(2024, 1, 15));
        service
            .create_transaction(credit(dec!(300), date(2024, 1, 10)).with_installments(
                3,
                InstallmentMode::Total,
                None,
            ))
            .await
            .unwrap();

        let bill = service.current_bill().await.unwrap();
        assert_eq!(bill.installments_total, Money::new(dec!(100)));

        let future = service.future_installments().await.unwrap();
        assert_eq!(future.len(), 2);
        assert_eq!((future[0].year, future[0].month), (2024, 2));

        let purchase = service.list_transactions().await.unwrap()[0].id;
        service.delete_transaction(purchase).await.unwrap();
        assert!(service.future_installments().await.unwrap().is_empty());
        assert!(service.current_bill().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_saving_box_movements_mirror_cash() {
        let service = service_on(date(2024, 6, 10));
        service
            .create_transaction(income(dec!(1000), date(2024, 6, 1)))
            .await
            .unwrap();
        let saving_box = service
            .create_saving_box(NewSavingBox {
                name: "Trip".into(),
                description: None,
                target_amount: Some(dec!(500)),
            })
            .await
            .unwrap();

        let receipt = service
            .deposit(saving_box.id, MovementRequest::new(amount(dec!(300))))
            .await
            .unwrap();
        assert_eq!(receipt.saving_box.balance, Money::new(dec!(300)));
        assert_eq!(receipt.transaction.category, category::SAVING_BOX_DEPOSIT);

        let receipt = service
            .withdraw(saving_box.id, MovementRequest::new(amount(dec!(100))))
            .await
            .unwrap();
        assert_eq!(receipt.saving_box.balance, Money::new(dec!(200)));
        assert_eq!(receipt.saving_box.progress(), dec!(40));
        assert!(receipt.transaction.is_income());

        let summary = service.summary().await.unwrap();
        assert_eq!(summary.balance, Money::new(dec!(800)));
    }

    #[tokio::test]
    async fn test_withdraw_over_balance_leaves_state_untouched() {
        let service = service_on(date(2024, 6, 10));
        let saving_box = service
            .create_saving_box(NewSavingBox {
                name: "Car".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let result = service
            .withdraw(saving_box.id, MovementRequest::new(amount(dec!(1))))
            .await;
        assert!(matches!(result, Err(FinanceError::ValidationError(_))));
        assert!(service.list_transactions().await.unwrap().is_empty());
        assert!(
            service
                .get_saving_box(saving_box.id)
                .await
                .unwrap()
                .movements
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_unknown_saving_box() {
        let service = service_on(date(2024, 6, 10));
        let result = service
            .deposit(7, MovementRequest::new(amount(dec!(1))))
            .await;
        assert!(matches!(result, Err(FinanceError::NotFound { id: 7, .. })));
    }
}
