//! Feed request service
//!
//! Persists the feed-request state machine from `shared::workflow`. Every
//! transition runs in one transaction: the request row is locked first, then
//! the stock row, and the pure workflow rules are applied to the locked rows
//! before anything is written. Any error drops the transaction, which rolls
//! back every statement issued so far.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    time, workflow, DateBounds, FarmerSummary, FeedHistoryEntry, FeedRequest, FeedRequestView,
    FeedSummary, WorkflowError,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::services::{FarmerService, StockService};

/// Feed request service
#[derive(Clone)]
pub struct FeedRequestService {
    db: PgPool,
}

/// Input for opening a feed request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestInput {
    pub farmer_id: Uuid,
    pub feed_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1 bag"))]
    pub qty_bags: i32,
}

/// Requests created in a date window, with the window that was applied
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestList {
    pub count: usize,
    pub data: Vec<FeedRequestView>,
    pub date_range: DateBounds,
}

/// A request joined with its farmer and stock item
#[derive(Debug, FromRow)]
struct ViewRow {
    #[sqlx(flatten)]
    request: FeedRequest,
    farmer_name: Option<String>,
    farmer_mobile: Option<String>,
    farmer_code: Option<String>,
    feed_name: Option<String>,
    feed_type: Option<String>,
}

impl ViewRow {
    fn into_view(self) -> FeedRequestView {
        let farmer = match (self.farmer_name, self.farmer_mobile, self.farmer_code) {
            (Some(full_name), Some(mobile), Some(code)) => Some(FarmerSummary {
                id: self.request.farmer_id,
                full_name,
                mobile,
                code,
            }),
            _ => None,
        };
        let feed = match (self.feed_name, self.feed_type) {
            (Some(name), Some(feed_type)) => Some(FeedSummary {
                id: self.request.feed_id,
                name,
                feed_type,
            }),
            _ => None,
        };

        FeedRequestView {
            request: self.request,
            farmer,
            feed,
        }
    }
}

const REQUEST_COLUMNS: &str = "id, farmer_id, feed_id, qty_bags, price, feed_price_at_creation, \
     status, created_by, approved_by, approved_at, selling_price_at_approval, \
     purchase_price_at_approval, total_profit_at_approval, created_at, updated_at";

const VIEW_SELECT: &str = r#"
    SELECT r.id, r.farmer_id, r.feed_id, r.qty_bags, r.price, r.feed_price_at_creation,
           r.status, r.created_by, r.approved_by, r.approved_at,
           r.selling_price_at_approval, r.purchase_price_at_approval,
           r.total_profit_at_approval, r.created_at, r.updated_at,
           f.full_name AS farmer_name, f.mobile AS farmer_mobile, f.code AS farmer_code,
           s.name AS feed_name, s.type AS feed_type
    FROM feed_requests r
    LEFT JOIN farmers f ON f.id = r.farmer_id
    LEFT JOIN stock s ON s.id = r.feed_id
"#;

impl FeedRequestService {
    /// Create a new FeedRequestService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open a pending request priced at the stock's current selling price
    ///
    /// No stock is reserved; availability is checked again on approval.
    pub async fn create(&self, input: CreateRequestInput, actor: &str) -> AppResult<FeedRequestView> {
        let farmer = FarmerService::new(self.db.clone()).find(input.farmer_id).await?;
        let stock = StockService::new(self.db.clone()).find(input.feed_id).await?;

        let request = workflow::open_request(
            farmer.as_ref(),
            stock.as_ref(),
            input.qty_bags,
            actor,
            Utc::now(),
        )?;

        sqlx::query(
            r#"
            INSERT INTO feed_requests (id, farmer_id, feed_id, qty_bags, price,
                                       feed_price_at_creation, status, created_by,
                                       created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(request.id)
        .bind(request.farmer_id)
        .bind(request.feed_id)
        .bind(request.qty_bags)
        .bind(request.price)
        .bind(request.feed_price_at_creation)
        .bind(request.status)
        .bind(&request.created_by)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.db)
        .await?;

        tracing::info!(
            request_id = %request.id,
            farmer_id = %request.farmer_id,
            feed_id = %request.feed_id,
            qty_bags = request.qty_bags,
            price = %request.price,
            created_by = %actor,
            "Feed request created"
        );

        self.get(request.id).await
    }

    /// Approve a pending request
    ///
    /// Decrements stock, appends the feed history entry, freezes the current
    /// stock prices onto the request and marks it approved, atomically.
    pub async fn approve(&self, id: Uuid, actor: &str) -> AppResult<FeedRequestView> {
        let mut tx = self.db.begin().await?;

        let mut request = Self::lock_in(&mut tx, id)
            .await?
            .ok_or(WorkflowError::NotFound("Request"))?;
        workflow::ensure_pending(&request)?;

        let mut stock = StockService::lock_in(&mut tx, request.feed_id).await?;
        let farmer = FarmerService::find_in(&mut tx, request.farmer_id).await?;

        let now = Utc::now();
        let approval =
            workflow::approve(&mut request, stock.as_mut(), farmer.as_ref(), actor, now)?;

        StockService::decrement_in(&mut tx, request.feed_id, request.qty_bags, actor, now).await?;
        Self::append_history_in(&mut tx, &approval.history).await?;
        Self::save_transition_in(&mut tx, &request).await?;

        tx.commit().await?;

        tracing::info!(
            request_id = %id,
            approved_by = %actor,
            qty_bags = request.qty_bags,
            remaining_bags = stock.as_ref().map(|s| s.quantity_bags).unwrap_or_default(),
            total_profit = %approval.snapshot.total_profit,
            "Feed request approved"
        );

        self.get(id).await
    }

    /// Reject a pending request; stock and history are untouched
    pub async fn reject(&self, id: Uuid, actor: &str) -> AppResult<FeedRequestView> {
        let mut tx = self.db.begin().await?;

        let mut request = Self::lock_in(&mut tx, id)
            .await?
            .ok_or(WorkflowError::NotFound("Request"))?;
        workflow::reject(&mut request, actor, Utc::now())?;
        Self::save_transition_in(&mut tx, &request).await?;

        tx.commit().await?;

        tracing::info!(request_id = %id, rejected_by = %actor, "Feed request rejected");
        self.get(id).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<FeedRequestView> {
        let row = sqlx::query_as::<_, ViewRow>(&format!("{VIEW_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(WorkflowError::NotFound("Request"))?;

        Ok(row.into_view())
    }

    /// Requests created within `bounds`, newest first
    ///
    /// With no bounds at all the current ten-day block of the month is used,
    /// evaluated in IST. Bounds are whole local days.
    pub async fn list(&self, bounds: DateBounds, now: DateTime<Utc>) -> AppResult<RequestList> {
        let offset = time::ist();
        let applied = time::resolve_request_window(bounds, time::local_date(now, offset));
        let (from, until) = time::bounds_to_instants(applied, offset);

        let rows = sqlx::query_as::<_, ViewRow>(&format!(
            r#"{VIEW_SELECT}
            WHERE ($1::timestamptz IS NULL OR r.created_at >= $1)
              AND ($2::timestamptz IS NULL OR r.created_at < $2)
            ORDER BY r.created_at DESC
            "#
        ))
        .bind(from)
        .bind(until)
        .fetch_all(&self.db)
        .await?;

        let data: Vec<FeedRequestView> = rows.into_iter().map(ViewRow::into_view).collect();
        Ok(RequestList {
            count: data.len(),
            data,
            date_range: applied,
        })
    }

    /// Pending requests, newest first
    pub async fn list_pending(&self) -> AppResult<Vec<FeedRequestView>> {
        let rows = sqlx::query_as::<_, ViewRow>(&format!(
            "{VIEW_SELECT} WHERE r.status = 'pending' ORDER BY r.created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ViewRow::into_view).collect())
    }

    /// Read a request inside an open transaction, taking a row lock
    async fn lock_in(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<Option<FeedRequest>> {
        let request = sqlx::query_as::<_, FeedRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM feed_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(request)
    }

    async fn append_history_in(
        tx: &mut Transaction<'_, Postgres>,
        entry: &FeedHistoryEntry,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO feed_history (id, farmer_id, date, feed_type, bags, price, approved_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.farmer_id)
        .bind(entry.date)
        .bind(&entry.feed_type)
        .bind(entry.bags)
        .bind(entry.price)
        .bind(&entry.approved_by)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Write a terminal status and its approval fields
    ///
    /// Guarded on the row still being pending, so a transition can only be
    /// written once.
    async fn save_transition_in(
        tx: &mut Transaction<'_, Postgres>,
        request: &FeedRequest,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE feed_requests
            SET status = $2,
                approved_by = $3,
                approved_at = $4,
                selling_price_at_approval = $5,
                purchase_price_at_approval = $6,
                total_profit_at_approval = $7,
                updated_at = $8
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(request.id)
        .bind(request.status)
        .bind(&request.approved_by)
        .bind(request.approved_at)
        .bind(request.selling_price_at_approval)
        .bind(request.purchase_price_at_approval)
        .bind(request.total_profit_at_approval)
        .bind(request.updated_at)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() != 1 {
            return Err(WorkflowError::InvalidState(workflow::ALREADY_PROCESSED.to_string()).into());
        }
        Ok(())
    }
}

/// Runs the approval transaction against a real database.
///
/// Skipped unless `DATABASE_URL` points at a Postgres instance the
/// migrations can be applied to. Each test seeds its own farmer and stock
/// item, so the database can be shared.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::farmer::CreateFarmerInput;
    use crate::services::stock::{CreateStockInput, UpdateStockInput};
    use rust_decimal::Decimal;
    use shared::{FarmerStatus, RequestStatus};
    use sqlx::postgres::PgPoolOptions;

    async fn test_pool() -> Option<PgPool> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        };
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(&url)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        Some(pool)
    }

    /// A fresh farmer and a stock item priced 120 purchase / 150 selling
    async fn seed(pool: &PgPool, bags: i32) -> (Uuid, Uuid) {
        let tag = Uuid::new_v4().as_u128();
        let farmer = FarmerService::new(pool.clone())
            .create(
                CreateFarmerInput {
                    full_name: "Ramesh Patil".to_string(),
                    mobile: format!("9{:09}", tag % 1_000_000_000),
                    code: format!("T-{}", Uuid::new_v4().simple()),
                    email: None,
                    status: FarmerStatus::Active,
                },
                "seed",
            )
            .await
            .unwrap();
        let stock = StockService::new(pool.clone())
            .create(
                CreateStockInput {
                    name: "Cattle Feed Premium".to_string(),
                    feed_type: "Pellet".to_string(),
                    quantity_bags: bags,
                    bag_weight: Decimal::from(50),
                    purchase_price: Decimal::from(120),
                    selling_price: Decimal::from(150),
                },
                "seed",
            )
            .await
            .unwrap();
        (farmer.id, stock.id)
    }

    async fn open(service: &FeedRequestService, farmer_id: Uuid, feed_id: Uuid, qty_bags: i32) -> Uuid {
        let input = CreateRequestInput {
            farmer_id,
            feed_id,
            qty_bags,
        };
        service.create(input, "admin1").await.unwrap().request.id
    }

    async fn bags_on_hand(pool: &PgPool, feed_id: Uuid) -> i32 {
        StockService::new(pool.clone())
            .get(feed_id)
            .await
            .unwrap()
            .quantity_bags
    }

    async fn history_rows(pool: &PgPool, farmer_id: Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM feed_history WHERE farmer_id = $1")
            .bind(farmer_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    /// Two 6-bag approvals against 10 bags: one wins, the other sees 4 left
    /// and leaves nothing behind
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_approvals_serialize_on_stock() {
        let Some(pool) = test_pool().await else { return };
        let (farmer_id, feed_id) = seed(&pool, 10).await;
        let service = FeedRequestService::new(pool.clone());
        let a = open(&service, farmer_id, feed_id, 6).await;
        let b = open(&service, farmer_id, feed_id, 6).await;

        let (first, second) = tokio::join!(service.approve(a, "admin1"), service.approve(b, "admin2"));
        let (winner, loser, err) = match (first, second) {
            (Ok(view), Err(err)) => (view, b, err),
            (Err(err), Ok(view)) => (view, a, err),
            other => panic!("unexpected: {:?}", other),
        };

        assert!(matches!(
            err,
            AppError::Workflow(WorkflowError::InsufficientStock {
                available: 4,
                requested: 6
            })
        ));
        assert_eq!(winner.request.status, RequestStatus::Approved);
        assert_eq!(winner.request.selling_price_at_approval, Some(Decimal::from(150)));
        assert_eq!(winner.request.purchase_price_at_approval, Some(Decimal::from(120)));
        assert_eq!(winner.request.total_profit_at_approval, Some(Decimal::from(180)));

        let loser = service.get(loser).await.unwrap();
        assert_eq!(loser.request.status, RequestStatus::Pending);
        assert_eq!(loser.request.approved_by, None);
        assert_eq!(loser.request.selling_price_at_approval, None);

        assert_eq!(bags_on_hand(&pool, feed_id).await, 4);
        assert_eq!(history_rows(&pool, farmer_id).await, 1);
    }

    #[tokio::test]
    async fn test_second_approval_is_refused() {
        let Some(pool) = test_pool().await else { return };
        let (farmer_id, feed_id) = seed(&pool, 10).await;
        let service = FeedRequestService::new(pool.clone());
        let id = open(&service, farmer_id, feed_id, 3).await;

        service.approve(id, "admin1").await.unwrap();
        let again = service.approve(id, "admin2").await;

        assert!(matches!(
            again,
            Err(AppError::Workflow(WorkflowError::InvalidState(_)))
        ));
        let view = service.get(id).await.unwrap();
        assert_eq!(view.request.status, RequestStatus::Approved);
        assert_eq!(view.request.approved_by.as_deref(), Some("admin1"));
        assert_eq!(bags_on_hand(&pool, feed_id).await, 7);
        assert_eq!(history_rows(&pool, farmer_id).await, 1);
    }

    #[tokio::test]
    async fn test_reject_leaves_stock_and_history() {
        let Some(pool) = test_pool().await else { return };
        let (farmer_id, feed_id) = seed(&pool, 10).await;
        let service = FeedRequestService::new(pool.clone());
        let id = open(&service, farmer_id, feed_id, 4).await;

        let rejected = service.reject(id, "admin3").await.unwrap();

        assert_eq!(rejected.request.status, RequestStatus::Rejected);
        assert_eq!(rejected.request.approved_by.as_deref(), Some("admin3"));
        assert!(rejected.request.approved_at.is_some());
        assert_eq!(rejected.request.total_profit_at_approval, None);

        let approve_after = service.approve(id, "admin1").await;
        assert!(matches!(
            approve_after,
            Err(AppError::Workflow(WorkflowError::InvalidState(_)))
        ));
        assert_eq!(bags_on_hand(&pool, feed_id).await, 10);
        assert_eq!(history_rows(&pool, farmer_id).await, 0);
    }

    /// Stock drawn down after the request was opened fails the approval
    /// without a partial decrement
    #[tokio::test]
    async fn test_insufficient_stock_rolls_back() {
        let Some(pool) = test_pool().await else { return };
        let (farmer_id, feed_id) = seed(&pool, 10).await;
        let service = FeedRequestService::new(pool.clone());
        let id = open(&service, farmer_id, feed_id, 8).await;

        let recount = UpdateStockInput {
            name: None,
            feed_type: None,
            quantity_bags: Some(5),
            bag_weight: None,
            purchase_price: None,
            selling_price: None,
        };
        StockService::new(pool.clone())
            .update(feed_id, recount, "admin2")
            .await
            .unwrap();

        let result = service.approve(id, "admin1").await;

        assert!(matches!(
            result,
            Err(AppError::Workflow(WorkflowError::InsufficientStock {
                available: 5,
                requested: 8
            }))
        ));
        assert_eq!(service.get(id).await.unwrap().request.status, RequestStatus::Pending);
        assert_eq!(bags_on_hand(&pool, feed_id).await, 5);
        assert_eq!(history_rows(&pool, farmer_id).await, 0);
    }
}
