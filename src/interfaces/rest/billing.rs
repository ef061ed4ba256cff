use super::{ApiResult, AppState, optional_date};
use crate::application::finance::BillPaymentReceipt;
use crate::domain::billing::{BillingInfo, FutureInstallmentGroup};
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Deserialize;
use tracing::info;

/// Body of `POST /api/billing/pay`; may be omitted entirely.
#[derive(Debug, Default, Deserialize)]
pub struct PayBillRequest {
    #[serde(default)]
    pub payment_date: Option<String>,
}

/// Handler for GET /api/billing/current
pub async fn current_bill(State(state): State<AppState>) -> ApiResult<Json<BillingInfo>> {
    info!("GET /api/billing/current");
    Ok(Json(state.service.current_bill().await?))
}

/// Handler for POST /api/billing/pay
///
/// An empty body pays today. Anything else must be a valid request object.
pub async fn pay_bill(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<BillPaymentReceipt>> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        PayBillRequest::default()
    } else {
        let Json(request) = Json::<PayBillRequest>::from_bytes(&body)?;
        request
    };
    info!("POST /api/billing/pay - payment_date: {:?}", request.payment_date);
    let payment_date = optional_date(request.payment_date.as_deref(), "payment_date")?;
    Ok(Json(state.service.pay_bill(payment_date).await?))
}

/// Handler for GET /api/installments/future
pub async fn future_installments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<FutureInstallmentGroup>>> {
    info!("GET /api/installments/future");
    Ok(Json(state.service.future_installments().await?))
}
