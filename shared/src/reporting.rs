//! Profit reporting over approved feed requests
//!
//! Reports read only the prices frozen at approval, so totals for a given set
//! of approved requests never change when stock prices are edited later.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Farmer, FarmerSummary, FeedHistoryEntry, PriceSnapshot};

/// One approved request as seen by the reports
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedSale {
    pub request_id: Uuid,
    pub farmer: FarmerSummary,
    pub feed_name: String,
    pub qty_bags: i32,
    pub snapshot: PriceSnapshot,
    pub approved_at: DateTime<Utc>,
    pub approved_by: String,
}

impl ApprovedSale {
    pub fn revenue(&self) -> Decimal {
        self.snapshot.selling_price * Decimal::from(self.qty_bags)
    }

    pub fn cost(&self) -> Decimal {
        self.snapshot.purchase_price * Decimal::from(self.qty_bags)
    }

    pub fn profit(&self) -> Decimal {
        self.snapshot.total_profit
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub total_farmers: usize,
    pub total_bags: i64,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub total_transactions: usize,
}

/// Per-feed totals for one farmer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedBreakdown {
    pub feed_name: String,
    pub bags: i64,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub last_approved: DateTime<Utc>,
    /// Approver of the most recent approval
    pub approved_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmerReport {
    pub farmer: FarmerSummary,
    pub total_bags: i64,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub feeds: Vec<FeedBreakdown>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary: ReportTotals,
    /// Sorted by total profit, highest first
    pub farmer_summary: Vec<FarmerReport>,
    pub transactions: Vec<ApprovedSale>,
}

/// Aggregate approved sales into overall and per-farmer totals
pub fn summarize(sales: Vec<ApprovedSale>) -> Report {
    let mut totals = ReportTotals {
        total_transactions: sales.len(),
        ..ReportTotals::default()
    };
    let mut farmers: Vec<FarmerReport> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for sale in &sales {
        let (revenue, cost, profit) = (sale.revenue(), sale.cost(), sale.profit());
        let bags = i64::from(sale.qty_bags);

        totals.total_bags += bags;
        totals.total_revenue += revenue;
        totals.total_cost += cost;
        totals.total_profit += profit;

        let slot = *index.entry(sale.farmer.id).or_insert_with(|| {
            farmers.push(FarmerReport {
                farmer: sale.farmer.clone(),
                total_bags: 0,
                total_revenue: Decimal::ZERO,
                total_cost: Decimal::ZERO,
                total_profit: Decimal::ZERO,
                feeds: Vec::new(),
            });
            farmers.len() - 1
        });
        let report = &mut farmers[slot];
        report.total_bags += bags;
        report.total_revenue += revenue;
        report.total_cost += cost;
        report.total_profit += profit;

        match report.feeds.iter_mut().find(|f| f.feed_name == sale.feed_name) {
            Some(feed) => {
                feed.bags += bags;
                feed.revenue += revenue;
                feed.cost += cost;
                feed.profit += profit;
                if sale.approved_at > feed.last_approved {
                    feed.last_approved = sale.approved_at;
                    feed.approved_by = sale.approved_by.clone();
                }
            }
            None => report.feeds.push(FeedBreakdown {
                feed_name: sale.feed_name.clone(),
                bags,
                revenue,
                cost,
                profit,
                last_approved: sale.approved_at,
                approved_by: sale.approved_by.clone(),
            }),
        }
    }

    farmers.sort_by(|a, b| b.total_profit.cmp(&a.total_profit));
    totals.total_farmers = farmers.len();

    Report {
        summary: totals,
        farmer_summary: farmers,
        transactions: sales,
    }
}

/// Deliveries of one feed to one farmer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedDeliveries {
    pub feed_name: String,
    pub total_bags: i64,
    pub total_amount: Decimal,
    pub transactions: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatementTotals {
    pub total_bags: i64,
    pub total_amount: Decimal,
    pub total_transactions: usize,
}

/// A farmer's delivery statement built from the feed history log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FarmerStatement {
    pub farmer: Farmer,
    pub summary: StatementTotals,
    /// In order of first delivery in `entries`
    pub feed_breakdown: Vec<FeedDeliveries>,
    pub transactions: Vec<FeedHistoryEntry>,
}

/// Total what a farmer has been charged, per feed, from history entries
pub fn farmer_statement(farmer: Farmer, entries: Vec<FeedHistoryEntry>) -> FarmerStatement {
    let mut summary = StatementTotals {
        total_transactions: entries.len(),
        ..StatementTotals::default()
    };
    let mut feeds: Vec<FeedDeliveries> = Vec::new();

    for entry in &entries {
        let bags = i64::from(entry.bags);
        summary.total_bags += bags;
        summary.total_amount += entry.price;

        match feeds.iter_mut().find(|f| f.feed_name == entry.feed_type) {
            Some(feed) => {
                feed.total_bags += bags;
                feed.total_amount += entry.price;
                feed.transactions += 1;
            }
            None => feeds.push(FeedDeliveries {
                feed_name: entry.feed_type.clone(),
                total_bags: bags,
                total_amount: entry.price,
                transactions: 1,
            }),
        }
    }

    FarmerStatement {
        farmer,
        summary,
        feed_breakdown: feeds,
        transactions: entries,
    }
}
