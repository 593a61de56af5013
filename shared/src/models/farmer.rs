//! Farmer registry models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Farmer membership status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "farmer_status", rename_all = "lowercase")
)]
pub enum FarmerStatus {
    #[default]
    Active,
    Inactive,
}

impl FarmerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FarmerStatus::Active => "Active",
            FarmerStatus::Inactive => "Inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Active" | "active" => Some(FarmerStatus::Active),
            "Inactive" | "inactive" => Some(FarmerStatus::Inactive),
            _ => None,
        }
    }

    /// The opposite status, used by the status toggle
    pub fn toggled(self) -> Self {
        match self {
            FarmerStatus::Active => FarmerStatus::Inactive,
            FarmerStatus::Inactive => FarmerStatus::Active,
        }
    }
}

impl std::fmt::Display for FarmerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cooperative member who can receive feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    pub id: Uuid,
    pub full_name: String,
    /// Unique, 10 digits
    pub mobile: String,
    /// Unique dairy code
    pub code: String,
    pub email: Option<String>,
    pub status: FarmerStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Farmer {
    pub fn is_active(&self) -> bool {
        self.status == FarmerStatus::Active
    }

    pub fn summary(&self) -> FarmerSummary {
        FarmerSummary {
            id: self.id,
            full_name: self.full_name.clone(),
            mobile: self.mobile.clone(),
            code: self.code.clone(),
        }
    }
}

/// Farmer identity embedded in request views and reports
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct FarmerSummary {
    pub id: Uuid,
    pub full_name: String,
    pub mobile: String,
    pub code: String,
}

/// Registry counts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct FarmerStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    /// Registered within the last 30 days
    pub recent: i64,
}
