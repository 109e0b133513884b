//! Page-load scoring path: takes the job list for a page, fills in scores
//! from the per-user cache, computes only the misses, and persists the cache
//! once per batch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::matching::cache::CacheStore;
use crate::matching::engine::{score_job, MAX_SCORE, ROLES_SKILLS_SECTOR_CAP};
use crate::models::job::JobRecord;
use crate::models::matching::{CacheEntry, MatchBreakdown};
use crate::models::profile::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Calculated match total, descending.
    MatchScore,
    /// Posting date, newest first.
    Recency,
}

/// A job plus its display-ready match data. `breakdown` is None for
/// anonymous visitors, where matching is skipped entirely.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredJob {
    pub job: JobRecord,
    pub score: u32,
    pub breakdown: Option<MatchBreakdown>,
    pub cached_at: Option<DateTime<Utc>>,
}

/// Re-derives the display total from breakdown fields instead of trusting a
/// stored flat score, so a schema drift between the two would surface here
/// rather than silently mis-rank.
pub fn calculated_total(b: &MatchBreakdown) -> u32 {
    let rs = (b.roles + b.skills + b.sector).min(ROLES_SKILLS_SECTOR_CAP);
    (rs + b.location + b.experience + b.salary + b.employment_type).min(MAX_SCORE)
}

/// Scores a page of jobs for a (possibly anonymous) visitor.
///
/// Cache hits are reused verbatim, even if the job record changed since they
/// were written — job-eligibility fields rarely change after posting, so
/// staleness is an accepted tradeoff. The cache is loaded once and saved once,
/// and only when at least one miss was computed.
pub async fn score_job_list(
    cache: &dyn CacheStore,
    profile: Option<&UserProfile>,
    jobs: Vec<JobRecord>,
    sort: SortMode,
) -> Vec<ScoredJob> {
    let Some(profile) = profile else {
        let mut scored: Vec<ScoredJob> = jobs
            .into_iter()
            .map(|job| ScoredJob {
                job,
                score: 0,
                breakdown: None,
                cached_at: None,
            })
            .collect();
        sort_scored(&mut scored, sort);
        return scored;
    };

    let mut entries = cache.load(profile.user_id).await;
    let mut dirty = false;

    let mut scored: Vec<ScoredJob> = jobs
        .into_iter()
        .map(|job| {
            let entry = match entries.get(&job.id) {
                Some(entry) => entry.clone(),
                None => {
                    let entry: CacheEntry = score_job(&job, profile).into();
                    entries.insert(job.id, entry.clone());
                    dirty = true;
                    entry
                }
            };
            ScoredJob {
                score: calculated_total(&entry.breakdown),
                breakdown: Some(entry.breakdown),
                cached_at: Some(entry.cached_at),
                job,
            }
        })
        .collect();

    if dirty {
        cache.save(profile.user_id, &entries).await;
    }

    sort_scored(&mut scored, sort);
    scored
}

fn sort_scored(scored: &mut [ScoredJob], sort: SortMode) {
    match sort {
        SortMode::MatchScore => scored.sort_by(|a, b| b.score.cmp(&a.score)),
        SortMode::Recency => scored.sort_by(|a, b| b.job.posted_at.cmp(&a.job.posted_at)),
    }
}
