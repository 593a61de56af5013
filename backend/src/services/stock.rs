//! Feed stock ledger service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{StockItem, StockStats, StockTypeBreakdown, DEFAULT_BAG_WEIGHT_KG};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Stock ledger service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

fn default_bag_weight() -> Decimal {
    Decimal::from(DEFAULT_BAG_WEIGHT_KG)
}

/// Input for adding a stock item
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockInput {
    #[validate(custom(function = "crate::validation::not_blank", message = "Feed name is required"))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(custom(function = "crate::validation::not_blank", message = "Feed type is required"))]
    pub feed_type: String,
    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity_bags: i32,
    #[serde(default = "default_bag_weight")]
    #[validate(custom = "crate::validation::bag_weight")]
    pub bag_weight: Decimal,
    #[validate(custom = "crate::validation::price")]
    pub purchase_price: Decimal,
    #[validate(custom = "crate::validation::price")]
    pub selling_price: Decimal,
}

/// Input for editing a stock item; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockInput {
    #[validate(custom(function = "crate::validation::not_blank", message = "Feed name is required"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[validate(custom(function = "crate::validation::not_blank", message = "Feed type is required"))]
    pub feed_type: Option<String>,
    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity_bags: Option<i32>,
    #[validate(custom = "crate::validation::bag_weight")]
    pub bag_weight: Option<Decimal>,
    #[validate(custom = "crate::validation::price")]
    pub purchase_price: Option<Decimal>,
    #[validate(custom = "crate::validation::price")]
    pub selling_price: Option<Decimal>,
}

/// Listing filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFilter {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub feed_type: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
}

#[derive(Debug, FromRow)]
struct TotalsRow {
    total_items: i64,
    low_stock_count: i64,
    total_bags: i64,
    total_value: Decimal,
}

const STOCK_COLUMNS: &str = "id, name, type AS feed_type, quantity_bags, bag_weight, \
     purchase_price, selling_price, last_updated, updated_by, created_at, updated_at";

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List stock items, most recently updated first
    pub async fn list(&self, filter: StockFilter, threshold: i32) -> AppResult<Vec<StockItem>> {
        let pattern = shared::normalize_search(filter.search.as_deref())
            .map(|term| format!("%{}%", term));
        let type_pattern = filter
            .feed_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", t));

        let items = sqlx::query_as::<_, StockItem>(&format!(
            r#"
            SELECT {STOCK_COLUMNS}
            FROM stock
            WHERE ($1::text IS NULL OR name ILIKE $1 OR type ILIKE $1)
              AND ($2::text IS NULL OR type ILIKE $2)
              AND (NOT $3 OR quantity_bags < $4)
            ORDER BY last_updated DESC
            "#
        ))
        .bind(pattern)
        .bind(type_pattern)
        .bind(filter.low_stock)
        .bind(threshold)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    /// Items with fewer than `threshold` bags, emptiest first
    pub async fn low_stock(&self, threshold: i32) -> AppResult<Vec<StockItem>> {
        let items = sqlx::query_as::<_, StockItem>(&format!(
            r#"
            SELECT {STOCK_COLUMNS}
            FROM stock
            WHERE quantity_bags < $1
            ORDER BY quantity_bags ASC
            "#
        ))
        .bind(threshold)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<StockItem> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock item".to_string()))
    }

    /// Look up an item without treating absence as an error
    pub async fn find(&self, id: Uuid) -> AppResult<Option<StockItem>> {
        let item =
            sqlx::query_as::<_, StockItem>(&format!("SELECT {STOCK_COLUMNS} FROM stock WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(item)
    }

    /// Read a stock item inside an open transaction, taking a row lock
    ///
    /// The lock is held until the transaction ends, so concurrent approvals
    /// against the same item observe each other's decrements.
    pub async fn lock_in(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<Option<StockItem>> {
        let item = sqlx::query_as::<_, StockItem>(&format!(
            "SELECT {STOCK_COLUMNS} FROM stock WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(item)
    }

    /// Draw `qty_bags` from an item inside the caller's transaction
    ///
    /// The statement only matches while enough bags remain; a miss is reported
    /// as an integrity violation since callers check availability first.
    pub async fn decrement_in(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        qty_bags: i32,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE stock
            SET quantity_bags = quantity_bags - $2,
                updated_by = $3,
                last_updated = $4,
                updated_at = $4
            WHERE id = $1 AND quantity_bags >= $2
            "#,
        )
        .bind(id)
        .bind(qty_bags)
        .bind(actor)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() != 1 {
            return Err(shared::WorkflowError::IntegrityViolation(format!(
                "stock {} could not supply {} bags",
                id, qty_bags
            ))
            .into());
        }
        Ok(())
    }

    pub async fn create(&self, input: CreateStockInput, actor: &str) -> AppResult<StockItem> {
        let item = sqlx::query_as::<_, StockItem>(&format!(
            r#"
            INSERT INTO stock (name, type, quantity_bags, bag_weight, purchase_price,
                               selling_price, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {STOCK_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(input.feed_type.trim())
        .bind(input.quantity_bags)
        .bind(input.bag_weight)
        .bind(input.purchase_price)
        .bind(input.selling_price)
        .bind(actor)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(stock_id = %item.id, name = %item.name, bags = item.quantity_bags, "Stock item added");
        Ok(item)
    }

    /// Edit an item; `last_updated` and `updated_by` are always refreshed
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateStockInput,
        actor: &str,
    ) -> AppResult<StockItem> {
        let item = sqlx::query_as::<_, StockItem>(&format!(
            r#"
            UPDATE stock SET
                name = COALESCE($2, name),
                type = COALESCE($3, type),
                quantity_bags = COALESCE($4, quantity_bags),
                bag_weight = COALESCE($5, bag_weight),
                purchase_price = COALESCE($6, purchase_price),
                selling_price = COALESCE($7, selling_price),
                updated_by = $8,
                last_updated = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {STOCK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.feed_type.as_deref().map(str::trim))
        .bind(input.quantity_bags)
        .bind(input.bag_weight)
        .bind(input.purchase_price)
        .bind(input.selling_price)
        .bind(actor)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?;

        tracing::info!(stock_id = %id, updated_by = %actor, "Stock item updated");
        Ok(item)
    }

    /// Delete an item; fails with a conflict while requests reference it
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM stock WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock item".to_string()));
        }
        Ok(())
    }

    /// Ledger-wide statistics with a per-type breakdown
    pub async fn stats(&self, threshold: i32) -> AppResult<StockStats> {
        let totals = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT COUNT(*) AS total_items,
                   COUNT(*) FILTER (WHERE quantity_bags < $1) AS low_stock_count,
                   COALESCE(SUM(quantity_bags), 0)::BIGINT AS total_bags,
                   COALESCE(SUM(quantity_bags * selling_price), 0) AS total_value
            FROM stock
            "#,
        )
        .bind(threshold)
        .fetch_one(&self.db)
        .await?;

        let type_breakdown = sqlx::query_as::<_, StockTypeBreakdown>(
            r#"
            SELECT type AS feed_type,
                   COUNT(*) AS count,
                   COALESCE(SUM(quantity_bags), 0)::BIGINT AS total_bags
            FROM stock
            GROUP BY type
            ORDER BY type
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(StockStats {
            total_items: totals.total_items,
            low_stock_count: totals.low_stock_count,
            total_bags: totals.total_bags,
            total_value: totals.total_value,
            type_breakdown,
        })
    }
}
