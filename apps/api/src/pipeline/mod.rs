//! Server-side re-scoring pipeline, triggered once per newly posted job.
//!
//! Scores every matchable profile against the job with the same engine the
//! page-load path uses, persists results at or above the notification
//! threshold, ranks premium users' matches for auto-apply when the job can be
//! applied to by email, and garbage-collects results older than 72 hours.

pub mod handlers;
pub mod store;
pub mod subscription;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::engine::score_job;
use crate::models::job::{ApplicationChannel, JobRecord, JobRow};
use crate::models::matching::PlanType;
use crate::models::profile::{UserProfile, UserProfileRow};
use crate::pipeline::store::MatchResultStore;
use crate::pipeline::subscription::SubscriptionLookup;

/// Minimum score for a match to be persisted and considered for notification.
pub const MATCH_THRESHOLD: u32 = 50;

/// Persisted results older than this are purged unconditionally, regardless
/// of notification or auto-apply state.
pub const RETENTION_HOURS: i64 = 72;

/// Bound on concurrent per-user scoring/persistence tasks.
const MAX_CONCURRENT_USERS: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub job_id: Uuid,
    pub profiles_considered: usize,
    pub matches_persisted: usize,
    pub auto_apply_flagged: usize,
    pub results_purged: u64,
}

/// A qualifying match by an active premium subscriber on a job with an email
/// application channel. Input to auto-apply ranking.
#[derive(Debug, Clone)]
pub struct PremiumCandidate {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub score: u32,
    pub plan: PlanType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoApplyFlag {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub rank: i32,
    pub plan: PlanType,
}

/// Runs the full pipeline for one job. Per-user failures are logged and
/// isolated; they never abort the batch.
pub async fn run_job_match_pipeline(
    db: &PgPool,
    store: &Arc<dyn MatchResultStore>,
    subscriptions: &Arc<dyn SubscriptionLookup>,
    job_id: Uuid,
) -> Result<PipelineSummary, AppError> {
    // Re-read the job at score time; listings are not guaranteed immutable
    // in storage between posting and this trigger firing.
    let row: Option<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(db)
        .await?;
    let job: JobRecord = row
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?
        .into();
    let job = Arc::new(job);

    let email_application = has_email_application(job.application.as_ref());

    let profiles: Vec<UserProfileRow> = sqlx::query_as(
        r#"
        SELECT * FROM user_profiles
        WHERE coalesce(cardinality(target_roles), 0) > 0
           OR coalesce(cardinality(cv_skills), 0) > 0
        "#,
    )
    .fetch_all(db)
    .await?;
    // The SQL filter is the primary gate; is_matchable re-checks in case the
    // profile columns drift out of sync with the query
    let profiles: Vec<UserProfile> = profiles
        .into_iter()
        .map(UserProfile::from)
        .filter(UserProfile::is_matchable)
        .collect();
    let profiles_considered = profiles.len();
    info!("Scoring job {job_id} against {profiles_considered} profiles");

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_USERS));
    let mut tasks: JoinSet<UserOutcome> = JoinSet::new();
    for profile in profiles {
        let store = Arc::clone(store);
        let subscriptions = Arc::clone(subscriptions);
        let job = Arc::clone(&job);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            score_one_user(
                store.as_ref(),
                subscriptions.as_ref(),
                &job,
                profile,
                email_application,
            )
            .await
        });
    }

    let mut matches_persisted = 0;
    let mut premium: Vec<PremiumCandidate> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => {
                if outcome.persisted {
                    matches_persisted += 1;
                }
                premium.extend(outcome.premium);
            }
            Err(e) => error!("scoring task for job {job_id} panicked: {e}"),
        }
    }

    let flags = rank_auto_apply(premium);
    let mut auto_apply_flagged = 0;
    for flag in &flags {
        match store.flag_auto_apply(flag).await {
            Ok(()) => auto_apply_flagged += 1,
            Err(e) => error!(
                "auto-apply flag failed for user {} job {}: {e}",
                flag.user_id, flag.job_id
            ),
        }
    }

    // Sliding-window cleanup; not tied to any per-row flag.
    let results_purged = store.purge_before(retention_cutoff(Utc::now())).await?;

    info!(
        "Pipeline for job {job_id}: {matches_persisted} persisted, \
         {auto_apply_flagged} auto-apply flags, {results_purged} purged"
    );

    Ok(PipelineSummary {
        job_id,
        profiles_considered,
        matches_persisted,
        auto_apply_flagged,
        results_purged,
    })
}

struct UserOutcome {
    persisted: bool,
    premium: Option<PremiumCandidate>,
}

/// Scores one profile against the job and persists it when the score clears
/// the threshold. Below-threshold scores write nothing.
async fn score_one_user(
    store: &dyn MatchResultStore,
    subscriptions: &dyn SubscriptionLookup,
    job: &JobRecord,
    profile: UserProfile,
    email_application: bool,
) -> UserOutcome {
    let user_id = profile.user_id;
    let result = score_job(job, &profile);
    if result.score < MATCH_THRESHOLD {
        return UserOutcome {
            persisted: false,
            premium: None,
        };
    }

    if let Err(e) = store.upsert_match(user_id, job.id, result.score).await {
        error!("persisting match for user {user_id} job {} failed: {e}", job.id);
        // Without a persisted row there is nothing to flag for auto-apply
        return UserOutcome {
            persisted: false,
            premium: None,
        };
    }

    let mut premium = None;
    if email_application {
        match subscriptions.get_subscription(user_id).await {
            Ok(Some(sub)) if sub.is_active => {
                if let Some(plan) = sub.plan() {
                    premium = Some(PremiumCandidate {
                        user_id,
                        job_id: job.id,
                        score: result.score,
                        plan,
                    });
                }
            }
            Ok(_) => {}
            Err(e) => warn!("premium lookup failed for user {user_id}, treating as not premium: {e}"),
        }
    }

    UserOutcome {
        persisted: true,
        premium,
    }
}

pub fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(RETENTION_HOURS)
}

/// True when applicants can reach the employer by email: either the declared
/// method is "email" or the email field (after any `mailto:` prefix) looks
/// like an address.
pub fn has_email_application(application: Option<&ApplicationChannel>) -> bool {
    let Some(app) = application else {
        return false;
    };
    if app
        .method
        .as_deref()
        .is_some_and(|m| m.trim().eq_ignore_ascii_case("email"))
    {
        return true;
    }
    app.email
        .as_deref()
        .map(|e| e.trim())
        .map(|e| e.strip_prefix("mailto:").unwrap_or(e))
        .is_some_and(|e| !e.is_empty() && e.contains('@'))
}

/// Orders premium candidates by score descending and flags each user's
/// matches up to their plan's top-N, assigning 1-based ranks in order. Caps
/// apply per trigger invocation only; same-day invocations for other jobs are
/// not reconciled here (the monthly limit lives in billing).
pub fn rank_auto_apply(mut candidates: Vec<PremiumCandidate>) -> Vec<AutoApplyFlag> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    let mut flagged_per_user: HashMap<Uuid, usize> = HashMap::new();
    let mut flags = Vec::new();
    let mut rank: i32 = 1;
    for candidate in candidates {
        let used = flagged_per_user.entry(candidate.user_id).or_insert(0);
        if *used >= candidate.plan.auto_apply_limit() {
            continue;
        }
        *used += 1;
        flags.push(AutoApplyFlag {
            user_id: candidate.user_id,
            job_id: candidate.job_id,
            rank,
            plan: candidate.plan,
        });
        rank += 1;
    }
    flags
}
