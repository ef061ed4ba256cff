use super::finance::{BillPaymentReceipt, FinanceService, MovementReceipt, MovementRequest};
use crate::domain::billing::{BillingInfo, FutureInstallmentGroup};
use crate::domain::saving_box::{NewSavingBox, SavingBox};
use crate::domain::transaction::{NewTransaction, Transaction};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// The operations the dashboard consumes, one per REST endpoint.
#[async_trait]
pub trait FinanceApi: Send + Sync {
    async fn list_transactions(&self) -> Result<Vec<Transaction>>;
    async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction>;
    async fn delete_transaction(&self, id: u64) -> Result<Transaction>;
    async fn current_bill(&self) -> Result<BillingInfo>;
    async fn pay_bill(&self, payment_date: Option<NaiveDate>) -> Result<BillPaymentReceipt>;
    async fn future_installments(&self) -> Result<Vec<FutureInstallmentGroup>>;
    async fn list_saving_boxes(&self) -> Result<Vec<SavingBox>>;
    async fn create_saving_box(&self, new: NewSavingBox) -> Result<SavingBox>;
    async fn get_saving_box(&self, id: u64) -> Result<SavingBox>;
    async fn deposit(&self, id: u64, request: MovementRequest) -> Result<MovementReceipt>;
    async fn withdraw(&self, id: u64, request: MovementRequest) -> Result<MovementReceipt>;
}

pub type FinanceApiRef = Arc<dyn FinanceApi>;

#[async_trait]
impl FinanceApi for FinanceService {
    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        FinanceService::list_transactions(self).await
    }

    async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction> {
        FinanceService::create_transaction(self, new).await
    }

    async fn delete_transaction(&self, id: u64) -> Result<Transaction> {
        FinanceService::delete_transaction(self, id).await
    }

    async fn current_bill(&self) -> Result<BillingInfo> {
        FinanceService::current_bill(self).await
    }

    async fn pay_bill(&self, payment_date: Option<NaiveDate>) -> Result<BillPaymentReceipt> {
        FinanceService::pay_bill(self, payment_date).await
    }

    async fn future_installments(&self) -> Result<Vec<FutureInstallmentGroup>> {
        FinanceService::future_installments(self).await
    }

    async fn list_saving_boxes(&self) -> Result<Vec<SavingBox>> {
        FinanceService::list_saving_boxes(self).await
    }

    async fn create_saving_box(&self, new: NewSavingBox) -> Result<SavingBox> {
        FinanceService::create_saving_box(self, new).await
    }

    async fn get_saving_box(&self, id: u64) -> Result<SavingBox> {
        FinanceService::get_saving_box(self, id).await
    }

    async fn deposit(&self, id: u64, request: MovementRequest) -> Result<MovementReceipt> {
        FinanceService::deposit(self, id, request).await
    }

    async fn withdraw(&self, id: u64, request: MovementRequest) -> Result<MovementReceipt> {
        FinanceService::withdraw(self, id, request).await
    }
}
