//! Authentication handlers

use axum::{extract::State, Json};
use shared::Admin;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::{LoginInput, LoginResponse};
use crate::services::{AdminService, AuthService};
use crate::validation::validated;
use crate::AppState;

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let input = validated(body)?;
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.login(input).await?;

    Ok(Json(response))
}

/// Profile of the signed-in admin
pub async fn profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Admin>> {
    let service = AdminService::new(state.db.clone());
    let admin = service.profile(current_user.0.admin_id).await?;

    Ok(Json(admin))
}
