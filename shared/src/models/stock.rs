//! Feed stock ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bag count below which an item is reported as low stock
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 20;

/// Default weight of one feed bag in kilograms
pub const DEFAULT_BAG_WEIGHT_KG: i64 = 50;

/// An inventory record for one feed type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub feed_type: String,
    /// Never negative
    pub quantity_bags: i32,
    pub bag_weight: Decimal,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub last_updated: DateTime<Utc>,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// Margin earned on a single bag at the current prices
    pub fn unit_margin(&self) -> Decimal {
        self.selling_price - self.purchase_price
    }

    /// Whether `qty_bags` can be drawn from this item right now
    pub fn can_supply(&self, qty_bags: i32) -> bool {
        self.quantity_bags >= qty_bags
    }

    pub fn is_low(&self, threshold: i32) -> bool {
        self.quantity_bags < threshold
    }

    /// Value of the bags on hand at the selling price
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.quantity_bags) * self.selling_price
    }
}

/// Per-type breakdown used by stock statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockTypeBreakdown {
    #[serde(rename = "type")]
    pub feed_type: String,
    pub count: i64,
    pub total_bags: i64,
}

/// Aggregate view over the whole ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockStats {
    pub total_items: i64,
    pub low_stock_count: i64,
    pub total_bags: i64,
    pub total_value: Decimal,
    pub type_breakdown: Vec<StockTypeBreakdown>,
}

/// Feed summary embedded in request views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub feed_type: String,
}
