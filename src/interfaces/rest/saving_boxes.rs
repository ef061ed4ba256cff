use super::{ApiResult, AppState, decimal_from_value, optional_date};
use crate::application::finance::{MovementReceipt, MovementRequest};
use crate::domain::money::Amount;
use crate::domain::saving_box::{NewSavingBox, SavingBox};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

/// Body of the deposit and withdraw endpoints.
#[derive(Debug, Deserialize)]
pub struct MovementBody {
    pub amount: Value,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl MovementBody {
    fn into_request(self) -> ApiResult<MovementRequest> {
        Ok(MovementRequest {
            amount: Amount::new(decimal_from_value(&self.amount, "amount")?)?,
            date: optional_date(self.date.as_deref(), "date")?,
            description: self.description,
        })
    }
}

/// Handler for GET /api/saving-boxes
pub async fn list_saving_boxes(State(state): State<AppState>) -> ApiResult<Json<Vec<SavingBox>>> {
    info!("GET /api/saving-boxes");
    Ok(Json(state.service.list_saving_boxes().await?))
}

/// Handler for POST /api/saving-boxes
pub async fn create_saving_box(
    State(state): State<AppState>,
    body: Result<Json<NewSavingBox>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SavingBox>)> {
    let Json(new) = body?;
    info!("POST /api/saving-boxes - name: {}", new.name);
    let created = state.service.create_saving_box(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for GET /api/saving-boxes/:id
pub async fn get_saving_box(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<SavingBox>> {
    let Path(id) = id?;
    info!("GET /api/saving-boxes/{}", id);
    Ok(Json(state.service.get_saving_box(id).await?))
}

/// Handler for POST /api/saving-boxes/:id/deposit
pub async fn deposit(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<MovementBody>, JsonRejection>,
) -> ApiResult<Json<MovementReceipt>> {
    let Path(id) = id?;
    let Json(body) = body?;
    info!("POST /api/saving-boxes/{}/deposit", id);
    Ok(Json(state.service.deposit(id, body.into_request()?).await?))
}

/// Handler for POST /api/saving-boxes/:id/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<MovementBody>, JsonRejection>,
) -> ApiResult<Json<MovementReceipt>> {
    let Path(id) = id?;
    let Json(body) = body?;
    info!("POST /api/saving-boxes/{}/withdraw", id);
    Ok(Json(state.service.withdraw(id, body.into_request()?).await?))
}
