//! Feed request handlers
//!
//! Creation, listing and the approve/reject transitions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use shared::{DateBounds, FeedRequestView};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::feed_request::{CreateRequestInput, RequestList};
use crate::services::FeedRequestService;
use crate::validation::validated;
use crate::AppState;

/// List requests in a date window; defaults to the current ten-day block
pub async fn list_requests(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(bounds): Query<DateBounds>,
) -> AppResult<Json<RequestList>> {
    let service = FeedRequestService::new(state.db.clone());

    Ok(Json(service.list(bounds, Utc::now()).await?))
}

pub async fn list_pending_requests(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<FeedRequestView>>> {
    let service = FeedRequestService::new(state.db.clone());

    Ok(Json(service.list_pending().await?))
}

pub async fn get_request(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<FeedRequestView>> {
    let service = FeedRequestService::new(state.db.clone());

    Ok(Json(service.get(request_id).await?))
}

/// Open a pending feed request
pub async fn create_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateRequestInput>,
) -> AppResult<(StatusCode, Json<FeedRequestView>)> {
    let input = validated(body)?;
    let service = FeedRequestService::new(state.db.clone());
    let request = service.create(input, current_user.0.actor()).await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// Approve a pending request, drawing its bags from stock
pub async fn approve_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<FeedRequestView>> {
    let service = FeedRequestService::new(state.db.clone());

    Ok(Json(
        service
            .approve(request_id, current_user.0.actor())
            .await?,
    ))
}

pub async fn reject_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<FeedRequestView>> {
    let service = FeedRequestService::new(state.db.clone());

    Ok(Json(
        service
            .reject(request_id, current_user.0.actor())
            .await?,
    ))
}
