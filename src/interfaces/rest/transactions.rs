use super::{ApiError, ApiResult, AppState, decimal_from_value, optional_date};
use crate::domain::money::Amount;
use crate::domain::transaction::{
    InstallmentMode, NewTransaction, PaymentMethod, Transaction, TransactionKind,
};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

/// Body of `POST /api/transactions`.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Value,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
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
    pub interest_per_month: Option<Value>,
    #[serde(default)]
    pub first_due_date: Option<String>,
}

impl TryFrom<CreateTransactionRequest> for NewTransaction {
    type Error = ApiError;

    fn try_from(request: CreateTransactionRequest) -> ApiResult<Self> {
        let amount = Amount::new(decimal_from_value(&request.amount, "amount")?)?;
        let date = optional_date(request.date.as_deref(), "date")?
            .ok_or_else(|| ApiError::bad_request("The field 'date' is required."))?;
        let interest_per_month = match request.interest_per_month {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(value) => Some(decimal_from_value(&value, "interest_per_month")?),
        };

        let mut new = NewTransaction::new(request.kind, amount, request.category, date);
        new.description = request.description;
        new.payment_method = request.payment_method;
        new.recurring = request.recurring;
        new.logo = request.logo;
        new.is_installment = request.is_installment;
        new.installment_count = request.installment_count;
        new.installment_mode = request.installment_mode;
        new.interest_per_month = interest_per_month;
        new.first_due_date = optional_date(request.first_due_date.as_deref(), "first_due_date")?;
        Ok(new)
    }
}

/// Handler for GET /api/transactions
pub async fn list_transactions(State(state): State<AppState>) -> ApiResult<Json<Vec<Transaction>>> {
    info!("GET /api/transactions");
    Ok(Json(state.service.list_transactions().await?))
}

/// Handler for POST /api/transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    body: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let Json(request) = body?;
    info!("POST /api/transactions - request: {:?}", request);
    let created = state
        .service
        .create_transaction(NewTransaction::try_from(request)?)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for DELETE /api/transactions/:id
pub async fn delete_transaction(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    info!("DELETE /api/transactions/{}", id);
    state.service.delete_transaction(id).await?;
    Ok(Json(json!({ "message": "Transaction deleted" })))
}
