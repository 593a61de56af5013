//! Feed history audit trail

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One approved delivery of feed to a farmer. Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct FeedHistoryEntry {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub date: DateTime<Utc>,
    /// Stock item name at the time of approval
    pub feed_type: String,
    pub bags: i32,
    pub price: Decimal,
    pub approved_by: String,
}
