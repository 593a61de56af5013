//! Feed request models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FarmerSummary, FeedSummary};

/// Feed request lifecycle status
///
/// `Pending` moves exactly once, to either `Approved` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "request_status", rename_all = "lowercase")
)]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A farmer's requisition for bags of one stock item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub feed_id: Uuid,
    /// Fixed at creation
    pub qty_bags: i32,
    /// `qty_bags × selling price` at creation
    pub price: Decimal,
    pub feed_price_at_creation: Decimal,
    pub status: RequestStatus,
    pub created_by: String,
    /// Set by both approval and rejection
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub selling_price_at_approval: Option<Decimal>,
    pub purchase_price_at_approval: Option<Decimal>,
    pub total_profit_at_approval: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedRequest {
    /// The frozen approval prices, present only once approved
    pub fn price_snapshot(&self) -> Option<PriceSnapshot> {
        match (
            self.selling_price_at_approval,
            self.purchase_price_at_approval,
            self.total_profit_at_approval,
        ) {
            (Some(selling_price), Some(purchase_price), Some(total_profit)) => Some(PriceSnapshot {
                selling_price,
                purchase_price,
                total_profit,
            }),
            _ => None,
        }
    }

    /// Snapshot fields are populated if and only if the request is approved
    pub fn snapshot_consistent(&self) -> bool {
        let populated = [
            self.selling_price_at_approval.is_some(),
            self.purchase_price_at_approval.is_some(),
            self.total_profit_at_approval.is_some(),
        ];
        if self.status == RequestStatus::Approved {
            populated.iter().all(|p| *p)
        } else {
            populated.iter().all(|p| !*p)
        }
    }
}

/// Stock prices frozen onto a request when it is approved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub selling_price: Decimal,
    pub purchase_price: Decimal,
    /// `(selling − purchase) × qty_bags`
    pub total_profit: Decimal,
}

/// A request together with the farmer and feed it refers to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequestView {
    #[serde(flatten)]
    pub request: FeedRequest,
    pub farmer: Option<FarmerSummary>,
    pub feed: Option<FeedSummary>,
}
