//! Farmer registry service

use chrono::{Duration, Utc};
use serde::Deserialize;
use shared::{Farmer, FarmerStats, FarmerStatus};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::validation::clean_optional;

/// Farmer registry service
#[derive(Clone)]
pub struct FarmerService {
    db: PgPool,
}

/// Input for registering a farmer
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFarmerInput {
    #[validate(custom(function = "crate::validation::not_blank", message = "Full name is required"))]
    pub full_name: String,
    #[validate(custom = "crate::validation::mobile")]
    pub mobile: String,
    #[validate(custom(function = "crate::validation::not_blank", message = "Dairy code is required"))]
    pub code: String,
    #[validate(custom = "crate::validation::email")]
    pub email: Option<String>,
    #[serde(default)]
    pub status: FarmerStatus,
}

/// Input for updating a farmer; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFarmerInput {
    #[validate(custom(function = "crate::validation::not_blank", message = "Full name is required"))]
    pub full_name: Option<String>,
    #[validate(custom = "crate::validation::mobile")]
    pub mobile: Option<String>,
    #[validate(custom(function = "crate::validation::not_blank", message = "Dairy code is required"))]
    pub code: Option<String>,
    /// An empty string clears the email
    #[validate(custom = "crate::validation::email")]
    pub email: Option<String>,
    pub status: Option<FarmerStatus>,
}

/// Listing filters
#[derive(Debug, Default, Deserialize)]
pub struct FarmerFilter {
    pub search: Option<String>,
    pub status: Option<FarmerStatus>,
}

const FARMER_COLUMNS: &str =
    "id, full_name, mobile, code, email, status, created_by, created_at, updated_at";

impl FarmerService {
    /// Create a new FarmerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List farmers matching the filter, newest first
    pub async fn list(&self, filter: FarmerFilter) -> AppResult<Vec<Farmer>> {
        let pattern = shared::normalize_search(filter.search.as_deref())
            .map(|term| format!("%{}%", term));

        let farmers = sqlx::query_as::<_, Farmer>(&format!(
            r#"
            SELECT {FARMER_COLUMNS}
            FROM farmers
            WHERE ($1::text IS NULL
                   OR full_name ILIKE $1 OR mobile ILIKE $1 OR code ILIKE $1 OR email ILIKE $1)
              AND ($2::farmer_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(pattern)
        .bind(filter.status)
        .fetch_all(&self.db)
        .await?;

        Ok(farmers)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Farmer> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Farmer".to_string()))
    }

    /// Look up a farmer without treating absence as an error
    pub async fn find(&self, id: Uuid) -> AppResult<Option<Farmer>> {
        let farmer = sqlx::query_as::<_, Farmer>(&format!(
            "SELECT {FARMER_COLUMNS} FROM farmers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(farmer)
    }

    /// Read a farmer inside an open transaction
    pub async fn find_in(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<Option<Farmer>> {
        let farmer = sqlx::query_as::<_, Farmer>(&format!(
            "SELECT {FARMER_COLUMNS} FROM farmers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(farmer)
    }

    pub async fn create(&self, input: CreateFarmerInput, actor: &str) -> AppResult<Farmer> {
        let farmer = sqlx::query_as::<_, Farmer>(&format!(
            r#"
            INSERT INTO farmers (full_name, mobile, code, email, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FARMER_COLUMNS}
            "#
        ))
        .bind(input.full_name.trim())
        .bind(&input.mobile)
        .bind(input.code.trim())
        .bind(clean_optional(input.email))
        .bind(input.status)
        .bind(actor)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(farmer_id = %farmer.id, code = %farmer.code, "Farmer registered");
        Ok(farmer)
    }

    pub async fn update(&self, id: Uuid, input: UpdateFarmerInput) -> AppResult<Farmer> {
        let email_given = input.email.is_some();

        sqlx::query_as::<_, Farmer>(&format!(
            r#"
            UPDATE farmers SET
                full_name = COALESCE($2, full_name),
                mobile = COALESCE($3, mobile),
                code = COALESCE($4, code),
                email = CASE WHEN $5 THEN $6 ELSE email END,
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {FARMER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.full_name.as_deref().map(str::trim))
        .bind(&input.mobile)
        .bind(input.code.as_deref().map(str::trim))
        .bind(email_given)
        .bind(clean_optional(input.email))
        .bind(input.status)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farmer".to_string()))
    }

    /// Delete a farmer; fails with a conflict while requests reference them
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM farmers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Farmer".to_string()));
        }
        tracing::info!(farmer_id = %id, "Farmer deleted");
        Ok(())
    }

    /// Flip Active ↔ Inactive
    pub async fn toggle_status(&self, id: Uuid) -> AppResult<Farmer> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, FarmerStatus>(
            "SELECT status FROM farmers WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Farmer".to_string()))?;

        let farmer = sqlx::query_as::<_, Farmer>(&format!(
            r#"
            UPDATE farmers SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {FARMER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(current.toggled())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(farmer_id = %id, status = %farmer.status, "Farmer status toggled");
        Ok(farmer)
    }

    /// Registry counts; "recent" covers the last 30 days
    pub async fn stats(&self) -> AppResult<FarmerStats> {
        let since = Utc::now() - Duration::days(30);

        let stats = sqlx::query_as::<_, FarmerStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'active') AS active,
                   COUNT(*) FILTER (WHERE status = 'inactive') AS inactive,
                   COUNT(*) FILTER (WHERE created_at >= $1) AS recent
            FROM farmers
            "#,
        )
        .bind(since)
        .fetch_one(&self.db)
        .await?;

        Ok(stats)
    }
}
