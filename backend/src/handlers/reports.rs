//! Reporting handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::reporting::{FarmerStatement, Report};
use shared::DateBounds;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::ReportFilter;
use crate::services::ReportingService;
use crate::AppState;

/// Profit report over approved requests
pub async fn get_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Report>> {
    let service = ReportingService::new(state.db.clone());

    Ok(Json(service.report(filter).await?))
}

/// Delivery statement for one farmer
pub async fn get_farmer_statement(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(farmer_id): Path<Uuid>,
    Query(bounds): Query<DateBounds>,
) -> AppResult<Json<FarmerStatement>> {
    let service = ReportingService::new(state.db.clone());

    Ok(Json(service.farmer_statement(farmer_id, bounds).await?))
}
