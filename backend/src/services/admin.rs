//! Admin account management
//!
//! Superadmins manage the `admin` accounts; superadmin rows are never listed or
//! modified through this service.

use serde::Deserialize;
use shared::Admin;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::AuthService;

/// Admin management service
#[derive(Clone)]
pub struct AdminService {
    db: PgPool,
}

/// Input for creating an admin
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdminInput {
    #[validate(custom(function = "crate::validation::not_blank", message = "Name is required"))]
    pub name: String,
    #[validate(custom = "crate::validation::mobile")]
    pub mobile: String,
    #[validate(custom = "crate::validation::password")]
    pub password: String,
}

/// Input for updating an admin
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAdminInput {
    #[validate(custom(function = "crate::validation::not_blank", message = "Name is required"))]
    pub name: Option<String>,
    #[validate(custom = "crate::validation::mobile")]
    pub mobile: Option<String>,
    #[validate(custom = "crate::validation::password")]
    pub password: Option<String>,
}

const ADMIN_COLUMNS: &str = "id, name, mobile, role, created_by, created_at, updated_at";

impl AdminService {
    /// Create a new AdminService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List admins, newest first
    pub async fn list(&self) -> AppResult<Vec<Admin>> {
        let admins = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE role = 'admin' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(admins)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Admin> {
        sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1 AND role = 'admin'"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin".to_string()))
    }

    /// Account of the signed-in user, superadmins included
    pub async fn profile(&self, id: Uuid) -> AppResult<Admin> {
        sqlx::query_as::<_, Admin>(&format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin".to_string()))
    }

    /// Create an admin account; the password is hashed before insert
    pub async fn create(&self, input: CreateAdminInput, actor: &str) -> AppResult<Admin> {
        let password_hash = AuthService::hash_password(&input.password)?;

        let admin = sqlx::query_as::<_, Admin>(&format!(
            r#"
            INSERT INTO admins (name, mobile, password_hash, role, created_by)
            VALUES ($1, $2, $3, 'admin', $4)
            RETURNING {ADMIN_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(&input.mobile)
        .bind(&password_hash)
        .bind(actor)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(admin = %admin.name, created_by = %actor, "Admin created");
        Ok(admin)
    }

    /// Partially update an admin; a new password is re-hashed
    pub async fn update(&self, id: Uuid, input: UpdateAdminInput) -> AppResult<Admin> {
        let password_hash = input
            .password
            .as_deref()
            .map(AuthService::hash_password)
            .transpose()?;

        sqlx::query_as::<_, Admin>(&format!(
            r#"
            UPDATE admins SET
                name = COALESCE($2, name),
                mobile = COALESCE($3, mobile),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1 AND role = 'admin'
            RETURNING {ADMIN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.mobile)
        .bind(&password_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM admins WHERE id = $1 AND role = 'admin'")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Admin".to_string()));
        }
        Ok(())
    }
}
