//! Farmer registry handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{AdminRole, Farmer, FarmerStats};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::farmer::{CreateFarmerInput, FarmerFilter, UpdateFarmerInput};
use crate::services::FarmerService;
use crate::validation::validated;
use crate::AppState;

/// List farmers, optionally filtered by search term and status
pub async fn list_farmers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<FarmerFilter>,
) -> AppResult<Json<Vec<Farmer>>> {
    let service = FarmerService::new(state.db.clone());

    Ok(Json(service.list(filter).await?))
}

/// Registry statistics
pub async fn farmer_stats(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<FarmerStats>> {
    let service = FarmerService::new(state.db.clone());

    Ok(Json(service.stats().await?))
}

pub async fn get_farmer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(farmer_id): Path<Uuid>,
) -> AppResult<Json<Farmer>> {
    let service = FarmerService::new(state.db.clone());

    Ok(Json(service.get(farmer_id).await?))
}

/// Register a farmer
pub async fn create_farmer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateFarmerInput>,
) -> AppResult<(StatusCode, Json<Farmer>)> {
    let input = validated(body)?;
    let service = FarmerService::new(state.db.clone());
    let farmer = service.create(input, current_user.0.actor()).await?;

    Ok((StatusCode::CREATED, Json(farmer)))
}

pub async fn update_farmer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(farmer_id): Path<Uuid>,
    Json(body): Json<UpdateFarmerInput>,
) -> AppResult<Json<Farmer>> {
    let input = validated(body)?;
    let service = FarmerService::new(state.db.clone());

    Ok(Json(service.update(farmer_id, input).await?))
}

/// Delete a farmer (superadmin only)
pub async fn delete_farmer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farmer_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.require(AdminRole::SuperAdmin)?;
    let service = FarmerService::new(state.db.clone());
    service.delete(farmer_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Flip a farmer between active and inactive
pub async fn toggle_farmer_status(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(farmer_id): Path<Uuid>,
) -> AppResult<Json<Farmer>> {
    let service = FarmerService::new(state.db.clone());

    Ok(Json(service.toggle_status(farmer_id).await?))
}
