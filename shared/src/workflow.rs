//! Feed request state machine
//!
//! Pure rules for creating, approving and rejecting feed requests. Every
//! function here checks all of its preconditions before it touches any record,
//! so an `Err` always leaves the caller's records exactly as they were. The
//! backend applies these rules to rows it has locked inside a database
//! transaction and then persists the mutated records.
//!
//! ```text
//! Pending ──approve──▶ Approved
//!    └─────reject───▶ Rejected
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{WorkflowError, WorkflowResult};
use crate::models::{
    Farmer, FeedHistoryEntry, FeedRequest, PriceSnapshot, RequestStatus, StockItem,
};

/// Message returned when a terminal request is approved or rejected again
pub const ALREADY_PROCESSED: &str = "Request is already processed";

/// Side effects produced by a successful approval
#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    /// Audit entry to append to the feed history
    pub history: FeedHistoryEntry,
    /// Prices frozen onto the request
    pub snapshot: PriceSnapshot,
}

/// Total price of `qty_bags` at `selling_price`
pub fn request_price(qty_bags: i32, selling_price: Decimal) -> Decimal {
    Decimal::from(qty_bags) * selling_price
}

/// Freeze the stock item's current prices for `qty_bags`
pub fn snapshot_prices(stock: &StockItem, qty_bags: i32) -> PriceSnapshot {
    PriceSnapshot {
        selling_price: stock.selling_price,
        purchase_price: stock.purchase_price,
        total_profit: stock.unit_margin() * Decimal::from(qty_bags),
    }
}

/// Build a new pending request for `qty_bags` of `stock` delivered to `farmer`
///
/// Checks, in order: quantity ≥ 1, farmer exists, farmer is active, feed
/// exists, enough bags on hand. No stock is reserved; availability is checked
/// again on approval.
pub fn open_request(
    farmer: Option<&Farmer>,
    stock: Option<&StockItem>,
    qty_bags: i32,
    actor: &str,
    now: DateTime<Utc>,
) -> WorkflowResult<FeedRequest> {
    if qty_bags < 1 {
        return Err(WorkflowError::InvalidQuantity(qty_bags));
    }

    let farmer = farmer.ok_or(WorkflowError::NotFound("Farmer"))?;
    if !farmer.is_active() {
        return Err(WorkflowError::InvalidState(
            "Cannot create request for inactive farmer".to_string(),
        ));
    }

    let stock = stock.ok_or(WorkflowError::NotFound("Feed"))?;
    ensure_available(stock, qty_bags)?;

    Ok(FeedRequest {
        id: Uuid::new_v4(),
        farmer_id: farmer.id,
        feed_id: stock.id,
        qty_bags,
        price: request_price(qty_bags, stock.selling_price),
        feed_price_at_creation: stock.selling_price,
        status: RequestStatus::Pending,
        created_by: actor.to_string(),
        approved_by: None,
        approved_at: None,
        selling_price_at_approval: None,
        purchase_price_at_approval: None,
        total_profit_at_approval: None,
        created_at: now,
        updated_at: now,
    })
}

/// Fail with `InvalidState` unless the request is still pending
pub fn ensure_pending(request: &FeedRequest) -> WorkflowResult<()> {
    if request.status.is_terminal() {
        return Err(WorkflowError::InvalidState(ALREADY_PROCESSED.to_string()));
    }
    Ok(())
}

fn ensure_available(stock: &StockItem, qty_bags: i32) -> WorkflowResult<()> {
    if !stock.can_supply(qty_bags) {
        return Err(WorkflowError::InsufficientStock {
            available: stock.quantity_bags,
            requested: qty_bags,
        });
    }
    Ok(())
}

/// Approve a pending request against the referenced stock item and farmer
///
/// On success the stock is decremented by `request.qty_bags`, the request is
/// `Approved` with the stock's *current* prices frozen onto it, and the
/// returned [`Approval`] carries the history entry to append. The snapshot uses
/// the prices at approval time even when they differ from
/// `feed_price_at_creation`.
///
/// `stock` and `farmer` are `None` when the referenced rows are missing, which
/// is reported as [`WorkflowError::IntegrityViolation`].
pub fn approve(
    request: &mut FeedRequest,
    stock: Option<&mut StockItem>,
    farmer: Option<&Farmer>,
    actor: &str,
    now: DateTime<Utc>,
) -> WorkflowResult<Approval> {
    ensure_pending(request)?;

    let (stock, farmer) = match (stock, farmer) {
        (Some(stock), Some(farmer)) => (stock, farmer),
        (None, _) => {
            return Err(WorkflowError::IntegrityViolation(format!(
                "feed {} referenced by request {} is missing",
                request.feed_id, request.id
            )))
        }
        (_, None) => {
            return Err(WorkflowError::IntegrityViolation(format!(
                "farmer {} referenced by request {} is missing",
                request.farmer_id, request.id
            )))
        }
    };
    if stock.id != request.feed_id || farmer.id != request.farmer_id {
        return Err(WorkflowError::IntegrityViolation(format!(
            "request {} does not reference the supplied feed or farmer",
            request.id
        )));
    }

    ensure_available(stock, request.qty_bags)?;

    // Nothing below can fail.
    stock.quantity_bags -= request.qty_bags;
    stock.updated_by = actor.to_string();
    stock.last_updated = now;
    stock.updated_at = now;

    let history = FeedHistoryEntry {
        id: Uuid::new_v4(),
        farmer_id: request.farmer_id,
        date: now,
        feed_type: stock.name.clone(),
        bags: request.qty_bags,
        price: request.price,
        approved_by: actor.to_string(),
    };

    let snapshot = snapshot_prices(stock, request.qty_bags);
    request.selling_price_at_approval = Some(snapshot.selling_price);
    request.purchase_price_at_approval = Some(snapshot.purchase_price);
    request.total_profit_at_approval = Some(snapshot.total_profit);
    request.status = RequestStatus::Approved;
    request.approved_by = Some(actor.to_string());
    request.approved_at = Some(now);
    request.updated_at = now;

    Ok(Approval { history, snapshot })
}

/// Reject a pending request. No stock or history side effects.
pub fn reject(request: &mut FeedRequest, actor: &str, now: DateTime<Utc>) -> WorkflowResult<()> {
    ensure_pending(request)?;

    request.status = RequestStatus::Rejected;
    request.approved_by = Some(actor.to_string());
    request.approved_at = Some(now);
    request.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FarmerStatus;

    fn stock(quantity_bags: i32, selling: i64, purchase: i64) -> StockItem {
        let now = Utc::now();
        StockItem {
            id: Uuid::new_v4(),
            name: "Cattle Feed Premium".to_string(),
            feed_type: "Pellet".to_string(),
            quantity_bags,
            bag_weight: Decimal::from(50),
            purchase_price: Decimal::from(purchase),
            selling_price: Decimal::from(selling),
            last_updated: now,
            updated_by: "seed".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn farmer(status: FarmerStatus) -> Farmer {
        let now = Utc::now();
        Farmer {
            id: Uuid::new_v4(),
            full_name: "Ramesh Patil".to_string(),
            mobile: "9876543210".to_string(),
            code: "D-101".to_string(),
            email: None,
            status,
            created_by: "admin1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_open_request_prices_at_current_selling_price() {
        let feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Active);

        let request = open_request(Some(&member), Some(&feed), 4, "admin1", Utc::now()).unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.price, Decimal::from(600));
        assert_eq!(request.feed_price_at_creation, Decimal::from(150));
        assert_eq!(request.created_by, "admin1");
        assert!(request.snapshot_consistent());
    }

    #[test]
    fn test_open_request_rejects_inactive_farmer() {
        let feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Inactive);

        let err = open_request(Some(&member), Some(&feed), 1, "admin1", Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
    }

    #[test]
    fn test_open_request_missing_references() {
        let feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Active);

        assert_eq!(
            open_request(None, Some(&feed), 1, "a", Utc::now()).unwrap_err(),
            WorkflowError::NotFound("Farmer")
        );
        assert_eq!(
            open_request(Some(&member), None, 1, "a", Utc::now()).unwrap_err(),
            WorkflowError::NotFound("Feed")
        );
    }

    #[test]
    fn test_open_request_rejects_zero_quantity() {
        let feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Active);

        assert_eq!(
            open_request(Some(&member), Some(&feed), 0, "a", Utc::now()).unwrap_err(),
            WorkflowError::InvalidQuantity(0)
        );
    }

    #[test]
    fn test_open_request_insufficient_stock_reports_available() {
        let feed = stock(3, 150, 120);
        let member = farmer(FarmerStatus::Active);

        let err = open_request(Some(&member), Some(&feed), 5, "a", Utc::now()).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InsufficientStock {
                available: 3,
                requested: 5
            }
        );
    }

    #[test]
    fn test_approve_deducts_and_snapshots() {
        let mut feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Active);
        let mut request =
            open_request(Some(&member), Some(&feed), 4, "clerk", Utc::now()).unwrap();

        let approval =
            approve(&mut request, Some(&mut feed), Some(&member), "admin1", Utc::now()).unwrap();

        assert_eq!(feed.quantity_bags, 6);
        assert_eq!(feed.updated_by, "admin1");
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.approved_by.as_deref(), Some("admin1"));
        assert!(request.approved_at.is_some());
        assert_eq!(request.selling_price_at_approval, Some(Decimal::from(150)));
        assert_eq!(request.purchase_price_at_approval, Some(Decimal::from(120)));
        assert_eq!(request.total_profit_at_approval, Some(Decimal::from(120)));
        assert_eq!(approval.history.bags, 4);
        assert_eq!(approval.history.price, Decimal::from(600));
        assert_eq!(approval.history.approved_by, "admin1");
        assert_eq!(approval.history.feed_type, "Cattle Feed Premium");
        assert_eq!(approval.history.farmer_id, member.id);
        assert!(request.snapshot_consistent());
    }

    #[test]
    fn test_approve_uses_price_at_approval_time() {
        let mut feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Active);
        let mut request = open_request(Some(&member), Some(&feed), 2, "a", Utc::now()).unwrap();

        feed.selling_price = Decimal::from(170);
        approve(&mut request, Some(&mut feed), Some(&member), "a", Utc::now()).unwrap();

        // price stays at creation; snapshot follows the ledger
        assert_eq!(request.price, Decimal::from(300));
        assert_eq!(request.selling_price_at_approval, Some(Decimal::from(170)));
        assert_eq!(request.total_profit_at_approval, Some(Decimal::from(100)));
    }

    #[test]
    fn test_approve_twice_is_invalid_state() {
        let mut feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Active);
        let mut request = open_request(Some(&member), Some(&feed), 4, "a", Utc::now()).unwrap();
        approve(&mut request, Some(&mut feed), Some(&member), "a", Utc::now()).unwrap();
        let before_stock = feed.clone();
        let before_request = request.clone();

        let err = approve(&mut request, Some(&mut feed), Some(&member), "b", Utc::now()).unwrap_err();

        assert_eq!(err, WorkflowError::InvalidState(ALREADY_PROCESSED.to_string()));
        assert_eq!(feed, before_stock);
        assert_eq!(request, before_request);
    }

    #[test]
    fn test_approve_insufficient_leaves_everything_untouched() {
        let mut feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Active);
        let mut first = open_request(Some(&member), Some(&feed), 6, "a", Utc::now()).unwrap();
        let mut second = open_request(Some(&member), Some(&feed), 6, "a", Utc::now()).unwrap();

        approve(&mut first, Some(&mut feed), Some(&member), "a", Utc::now()).unwrap();
        assert_eq!(feed.quantity_bags, 4);

        let before = second.clone();
        let err = approve(&mut second, Some(&mut feed), Some(&member), "a", Utc::now()).unwrap_err();

        assert_eq!(
            err,
            WorkflowError::InsufficientStock {
                available: 4,
                requested: 6
            }
        );
        assert_eq!(feed.quantity_bags, 4);
        assert_eq!(second, before);
        assert_eq!(second.status, RequestStatus::Pending);
    }

    #[test]
    fn test_approve_missing_rows_is_integrity_violation() {
        let mut feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Active);
        let mut request = open_request(Some(&member), Some(&feed), 1, "a", Utc::now()).unwrap();

        let err = approve(&mut request, None, Some(&member), "a", Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));

        let err = approve(&mut request, Some(&mut feed), None, "a", Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::IntegrityViolation(_)));
        assert_eq!(feed.quantity_bags, 10);
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[test]
    fn test_approve_ignores_farmer_status_change() {
        let mut feed = stock(10, 150, 120);
        let mut member = farmer(FarmerStatus::Active);
        let mut request = open_request(Some(&member), Some(&feed), 1, "a", Utc::now()).unwrap();

        member.status = FarmerStatus::Inactive;
        assert!(approve(&mut request, Some(&mut feed), Some(&member), "a", Utc::now()).is_ok());
    }

    #[test]
    fn test_reject_pending_request() {
        let feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Active);
        let mut request = open_request(Some(&member), Some(&feed), 4, "a", Utc::now()).unwrap();

        reject(&mut request, "admin2", Utc::now()).unwrap();

        assert_eq!(request.status, RequestStatus::Rejected);
        assert_eq!(request.approved_by.as_deref(), Some("admin2"));
        assert!(request.approved_at.is_some());
        assert!(request.price_snapshot().is_none());
        assert!(request.snapshot_consistent());

        assert!(matches!(
            reject(&mut request, "admin2", Utc::now()),
            Err(WorkflowError::InvalidState(_))
        ));
    }

    #[test]
    fn test_rejected_request_cannot_be_approved() {
        let mut feed = stock(10, 150, 120);
        let member = farmer(FarmerStatus::Active);
        let mut request = open_request(Some(&member), Some(&feed), 4, "a", Utc::now()).unwrap();
        reject(&mut request, "a", Utc::now()).unwrap();

        let err = approve(&mut request, Some(&mut feed), Some(&member), "a", Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)));
        assert_eq!(feed.quantity_bags, 10);
    }

    #[test]
    fn test_snapshot_prices_with_loss() {
        let feed = stock(10, 100, 120);
        let snapshot = snapshot_prices(&feed, 3);
        assert_eq!(snapshot.total_profit, Decimal::from(-60));
    }
}
