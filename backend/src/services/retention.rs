//! Data retention sweep
//!
//! Old pending and rejected requests are deleted once a day. Approved
//! requests, feed history, farmers, admins and stock are never purged.

use chrono::{DateTime, Utc};
use shared::{time, RequestStatus};
use sqlx::PgPool;

use crate::config::RetentionConfig;
use crate::error::AppResult;

/// Statuses removed by the daily sweep
pub const PURGEABLE_STATUSES: [RequestStatus; 2] = [RequestStatus::Pending, RequestStatus::Rejected];

/// Retention service
#[derive(Clone)]
pub struct RetentionService {
    db: PgPool,
}

impl RetentionService {
    /// Create a new RetentionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Delete requests created before `cutoff` whose status is in `statuses`
    ///
    /// Returns the number of requests deleted.
    pub async fn purge_older_than(
        &self,
        cutoff: DateTime<Utc>,
        statuses: &[RequestStatus],
    ) -> AppResult<u64> {
        let statuses: Vec<String> = statuses
            .iter()
            .filter(|s| **s != RequestStatus::Approved)
            .map(|s| s.as_str().to_string())
            .collect();
        if statuses.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            DELETE FROM feed_requests
            WHERE created_at < $1
              AND status::text = ANY($2)
            "#,
        )
        .bind(cutoff)
        .bind(&statuses)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// One sweep with the configured retention period
    pub async fn sweep(&self, months: u32, now: DateTime<Utc>) -> AppResult<u64> {
        let cutoff = time::retention_cutoff(now, months);
        let deleted = self.purge_older_than(cutoff, &PURGEABLE_STATUSES).await?;

        if deleted > 0 {
            tracing::info!(deleted, %cutoff, "Purged old pending and rejected requests");
        } else {
            tracing::debug!(%cutoff, "No requests old enough to purge");
        }
        Ok(deleted)
    }
}

/// Background task running the sweep daily at the configured local hour
pub async fn retention_task(service: RetentionService, config: RetentionConfig) {
    let offset = time::ist();

    loop {
        let now = Utc::now();
        let next = time::next_daily_run(now, config.run_hour, offset);
        let wait = (next - now)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(60));
        tracing::debug!(next_run = %next, "Retention sweep scheduled");

        tokio::time::sleep(wait).await;

        if let Err(e) = service.sweep(config.months, Utc::now()).await {
            tracing::error!(error = %e, "Retention sweep failed");
        }
    }
}
