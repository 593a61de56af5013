//! Feed stock handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{StockItem, StockStats, DEFAULT_LOW_STOCK_THRESHOLD};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::{CreateStockInput, StockFilter, UpdateStockInput};
use crate::services::StockService;
use crate::validation::validated;
use crate::AppState;

fn default_threshold() -> i32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

/// Low-stock threshold query parameter
#[derive(Debug, Deserialize)]
pub struct ThresholdQuery {
    #[serde(default = "default_threshold")]
    pub threshold: i32,
}

/// List stock items
pub async fn list_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<StockFilter>,
) -> AppResult<Json<Vec<StockItem>>> {
    let service = StockService::new(state.db.clone());

    Ok(Json(service.list(filter, DEFAULT_LOW_STOCK_THRESHOLD).await?))
}

/// Items below the low-stock threshold
pub async fn low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ThresholdQuery>,
) -> AppResult<Json<Vec<StockItem>>> {
    let service = StockService::new(state.db.clone());

    Ok(Json(service.low_stock(query.threshold).await?))
}

pub async fn stock_stats(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<StockStats>> {
    let service = StockService::new(state.db.clone());

    Ok(Json(service.stats(DEFAULT_LOW_STOCK_THRESHOLD).await?))
}

pub async fn get_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(stock_id): Path<Uuid>,
) -> AppResult<Json<StockItem>> {
    let service = StockService::new(state.db.clone());

    Ok(Json(service.get(stock_id).await?))
}

/// Add a stock item
pub async fn create_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateStockInput>,
) -> AppResult<(StatusCode, Json<StockItem>)> {
    let input = validated(body)?;
    let service = StockService::new(state.db.clone());
    let item = service.create(input, current_user.0.actor()).await?;

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(stock_id): Path<Uuid>,
    Json(body): Json<UpdateStockInput>,
) -> AppResult<Json<StockItem>> {
    let input = validated(body)?;
    let service = StockService::new(state.db.clone());

    Ok(Json(
        service
            .update(stock_id, input, current_user.0.actor())
            .await?,
    ))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(stock_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = StockService::new(state.db.clone());
    service.delete(stock_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
