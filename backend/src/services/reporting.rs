//! Reporting service over approved feed requests

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::reporting::{self, ApprovedSale, FarmerStatement, Report};
use shared::{time, DateBounds, FarmerSummary, FeedHistoryEntry, PriceSnapshot};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::FarmerService;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Report filters; dates are whole IST days on the approval date
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub farmer_id: Option<Uuid>,
    /// Restrict to approvals by this admin
    pub admin_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportFilter {
    fn bounds(&self) -> DateBounds {
        DateBounds {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Row for approved sale query
#[derive(Debug, FromRow)]
struct SaleRow {
    request_id: Uuid,
    farmer_id: Uuid,
    farmer_name: String,
    farmer_mobile: String,
    farmer_code: String,
    feed_name: String,
    qty_bags: i32,
    selling_price_at_approval: Option<Decimal>,
    purchase_price_at_approval: Option<Decimal>,
    total_profit_at_approval: Option<Decimal>,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<String>,
}

impl SaleRow {
    fn into_sale(self) -> AppResult<ApprovedSale> {
        let (Some(selling_price), Some(purchase_price), Some(total_profit), Some(approved_at)) = (
            self.selling_price_at_approval,
            self.purchase_price_at_approval,
            self.total_profit_at_approval,
            self.approved_at,
        ) else {
            return Err(shared::WorkflowError::IntegrityViolation(format!(
                "approved request {} has no price snapshot",
                self.request_id
            ))
            .into());
        };

        Ok(ApprovedSale {
            request_id: self.request_id,
            farmer: FarmerSummary {
                id: self.farmer_id,
                full_name: self.farmer_name,
                mobile: self.farmer_mobile,
                code: self.farmer_code,
            },
            feed_name: self.feed_name,
            qty_bags: self.qty_bags,
            snapshot: PriceSnapshot {
                selling_price,
                purchase_price,
                total_profit,
            },
            approved_at,
            approved_by: self.approved_by.unwrap_or_default(),
        })
    }
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Profit report over approved requests, using the prices frozen at approval
    pub async fn report(&self, filter: ReportFilter) -> AppResult<Report> {
        let approver = match filter.admin_id {
            Some(admin_id) => Some(
                sqlx::query_scalar::<_, String>("SELECT name FROM admins WHERE id = $1")
                    .bind(admin_id)
                    .fetch_optional(&self.db)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Admin".to_string()))?,
            ),
            None => None,
        };
        let (from, until) = time::bounds_to_instants(filter.bounds(), time::ist());

        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT r.id AS request_id, r.farmer_id,
                   f.full_name AS farmer_name, f.mobile AS farmer_mobile, f.code AS farmer_code,
                   COALESCE(s.name, 'Unknown feed') AS feed_name,
                   r.qty_bags, r.selling_price_at_approval, r.purchase_price_at_approval,
                   r.total_profit_at_approval, r.approved_at, r.approved_by
            FROM feed_requests r
            JOIN farmers f ON f.id = r.farmer_id
            LEFT JOIN stock s ON s.id = r.feed_id
            WHERE r.status = 'approved'
              AND ($1::uuid IS NULL OR r.farmer_id = $1)
              AND ($2::text IS NULL OR r.approved_by = $2)
              AND ($3::timestamptz IS NULL OR r.approved_at >= $3)
              AND ($4::timestamptz IS NULL OR r.approved_at < $4)
            ORDER BY r.approved_at DESC
            "#,
        )
        .bind(filter.farmer_id)
        .bind(approver)
        .bind(from)
        .bind(until)
        .fetch_all(&self.db)
        .await?;

        let sales = rows
            .into_iter()
            .map(SaleRow::into_sale)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(reporting::summarize(sales))
    }

    /// One farmer's deliveries, read from the feed history log
    pub async fn farmer_statement(
        &self,
        farmer_id: Uuid,
        bounds: DateBounds,
    ) -> AppResult<FarmerStatement> {
        let farmer = FarmerService::new(self.db.clone()).get(farmer_id).await?;
        let (from, until) = time::bounds_to_instants(bounds, time::ist());

        let entries = sqlx::query_as::<_, FeedHistoryEntry>(
            r#"
            SELECT id, farmer_id, date, feed_type, bags, price, approved_by
            FROM feed_history
            WHERE farmer_id = $1
              AND ($2::timestamptz IS NULL OR date >= $2)
              AND ($3::timestamptz IS NULL OR date < $3)
            ORDER BY date DESC
            "#,
        )
        .bind(farmer_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.db)
        .await?;

        Ok(reporting::farmer_statement(farmer, entries))
    }
}
