use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::pipeline::AutoApplyFlag;

/// Persistence seam for match results. Held in `AppState` as
/// `Arc<dyn MatchResultStore>`; tests substitute an in-memory implementation
/// so the pipeline's persist/skip decisions can be exercised without a
/// database.
#[async_trait]
pub trait MatchResultStore: Send + Sync {
    /// Upserts by (user, job): repeated triggers for the same pair overwrite
    /// rather than duplicate.
    async fn upsert_match(&self, user_id: Uuid, job_id: Uuid, score: u32) -> Result<()>;

    /// Marks an already-persisted result auto-apply eligible with its rank
    /// and plan.
    async fn flag_auto_apply(&self, flag: &AutoApplyFlag) -> Result<()>;

    /// Deletes results computed before `cutoff`, regardless of notification
    /// or auto-apply state. Returns the number removed.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

pub struct PgMatchResultStore {
    pool: PgPool,
}

impl PgMatchResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchResultStore for PgMatchResultStore {
    /// Native upsert: the concurrent-trigger race for one (user, job) pair
    /// collapses into a single atomic statement.
    async fn upsert_match(&self, user_id: Uuid, job_id: Uuid, score: u32) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_match_results
                (user_id, job_id, match_score, notification_sent, notification_date,
                 computed_at, is_auto_apply_eligible, auto_apply_rank, plan_type)
            VALUES ($1, $2, $3, false, CURRENT_DATE, now(), false, NULL, NULL)
            ON CONFLICT (user_id, job_id) DO UPDATE
            SET match_score = EXCLUDED.match_score,
                notification_sent = false,
                notification_date = EXCLUDED.notification_date,
                computed_at = EXCLUDED.computed_at
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(score as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn flag_auto_apply(&self, flag: &AutoApplyFlag) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE job_match_results
            SET is_auto_apply_eligible = true, auto_apply_rank = $3, plan_type = $4
            WHERE user_id = $1 AND job_id = $2
            "#,
        )
        .bind(flag.user_id)
        .bind(flag.job_id)
        .bind(flag.rank)
        .bind(flag.plan.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM job_match_results WHERE computed_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
