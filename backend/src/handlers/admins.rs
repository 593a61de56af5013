//! Admin account handlers (superadmin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Admin, AdminRole};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::admin::{CreateAdminInput, UpdateAdminInput};
use crate::services::AdminService;
use crate::validation::validated;
use crate::AppState;

/// List admin accounts
pub async fn list_admins(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Admin>>> {
    current_user.require(AdminRole::SuperAdmin)?;
    let service = AdminService::new(state.db.clone());

    Ok(Json(service.list().await?))
}

/// Get a single admin account
pub async fn get_admin(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(admin_id): Path<Uuid>,
) -> AppResult<Json<Admin>> {
    current_user.require(AdminRole::SuperAdmin)?;
    let service = AdminService::new(state.db.clone());

    Ok(Json(service.get(admin_id).await?))
}

/// Create an admin account
pub async fn create_admin(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateAdminInput>,
) -> AppResult<(StatusCode, Json<Admin>)> {
    current_user.require(AdminRole::SuperAdmin)?;
    let input = validated(body)?;
    let service = AdminService::new(state.db.clone());
    let admin = service.create(input, current_user.0.actor()).await?;

    Ok((StatusCode::CREATED, Json(admin)))
}

/// Update an admin account
pub async fn update_admin(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(admin_id): Path<Uuid>,
    Json(body): Json<UpdateAdminInput>,
) -> AppResult<Json<Admin>> {
    current_user.require(AdminRole::SuperAdmin)?;
    let input = validated(body)?;
    let service = AdminService::new(state.db.clone());

    Ok(Json(service.update(admin_id, input).await?))
}

/// Delete an admin account
pub async fn delete_admin(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(admin_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.require(AdminRole::SuperAdmin)?;
    let service = AdminService::new(state.db.clone());
    service.delete(admin_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
