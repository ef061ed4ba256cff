//! JSON API served by `solvix serve`.

pub mod billing;
pub mod saving_boxes;
pub mod transactions;

use crate::application::finance::FinanceService;
use crate::error::FinanceError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FinanceService>,
}

impl AppState {
    pub fn new(service: Arc<FinanceService>) -> Self {
        Self { service }
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route("/api/transactions/:id", delete(transactions::delete_transaction))
        .route("/api/billing/current", get(billing::current_bill))
        .route("/api/billing/pay", post(billing::pay_bill))
        .route(
            "/api/installments/future",
            get(billing::future_installments),
        )
        .route(
            "/api/saving-boxes",
            get(saving_boxes::list_saving_boxes).post(saving_boxes::create_saving_box),
        )
        .route("/api/saving-boxes/:id", get(saving_boxes::get_saving_box))
        .route("/api/saving-boxes/:id/deposit", post(saving_boxes::deposit))
        .route("/api/saving-boxes/:id/withdraw", post(saving_boxes::withdraw))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Error body `{"error": ...}` with a status derived from the failure.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<FinanceError> for ApiError {
    fn from(e: FinanceError) -> Self {
        let status = match &e {
            FinanceError::ValidationError(_) => StatusCode::BAD_REQUEST,
            FinanceError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {:?}", e);
        }
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Accepts a JSON number or a string using `,` or `.` as decimal separator.
pub(crate) fn decimal_from_value(value: &Value, field: &str) -> ApiResult<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().replace(',', "."),
        _ => return Err(ApiError::bad_request(format!("The field '{field}' must be a number."))),
    };
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ApiError::bad_request(format!("The field '{field}' must be a number.")))
}

/// Parses a `YYYY-MM-DD` date; blank input means "not given".
pub(crate) fn optional_date(value: Option<&str>, field: &str) -> ApiResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ApiError::bad_request(format!("The field '{field}' must be a date (YYYY-MM-DD)."))
            }),
    }
}
