#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-factor contributions behind a match score. Exposed alongside the flat
/// score so the breakdown modal and server logs can explain the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub roles: u32,
    pub skills: u32,
    pub sector: u32,
    pub location: u32,
    pub experience: u32,
    pub salary: u32,
    pub employment_type: u32,
    /// roles + skills + sector after the 80-point cap.
    pub rs_capped: u32,
    /// Sum before the final clamp to 100.
    pub total: u32,
}

/// Output of the match engine. Pure derived value — recomputed and replaced,
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: u32,
    pub breakdown: MatchBreakdown,
    pub computed_at: DateTime<Utc>,
}

/// One entry in a user's client-side score cache, keyed by job id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub score: u32,
    pub breakdown: MatchBreakdown,
    pub cached_at: DateTime<Utc>,
}

impl From<MatchResult> for CacheEntry {
    fn from(result: MatchResult) -> Self {
        CacheEntry {
            score: result.score,
            breakdown: result.breakdown,
            cached_at: result.computed_at,
        }
    }
}

/// Premium plan tier. Determines how many top matches per pipeline run are
/// flagged auto-apply eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanType {
    Pro,
    Max,
    Elite,
}

impl PlanType {
    pub fn auto_apply_limit(self) -> usize {
        match self {
            PlanType::Pro => 5,
            PlanType::Max => 10,
            PlanType::Elite => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlanType::Pro => "Pro",
            PlanType::Max => "Max",
            PlanType::Elite => "Elite",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pro" => Some(PlanType::Pro),
            "max" => Some(PlanType::Max),
            "elite" => Some(PlanType::Elite),
            _ => None,
        }
    }
}

/// Billing's view of a subscription. Consumed read-only: eligibility for
/// auto-apply ranking and the top-N flag count. Quota enforcement lives in
/// billing, not here.
#[derive(Debug, Clone, FromRow)]
pub struct PremiumSubscription {
    pub user_id: Uuid,
    pub plan_type: String,
    pub monthly_application_limit: i32,
    pub applications_used_this_month: i32,
    pub monthly_reset_date: NaiveDate,
    pub is_active: bool,
}

impl PremiumSubscription {
    pub fn plan(&self) -> Option<PlanType> {
        PlanType::parse(&self.plan_type)
    }
}

/// `job_match_results` row. Created by the server pipeline for scores ≥ the
/// notification threshold, read by the daily sweep, purged after 72 hours.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchResultRow {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub match_score: i32,
    pub notification_sent: bool,
    pub notification_date: NaiveDate,
    pub computed_at: DateTime<Utc>,
    pub is_auto_apply_eligible: bool,
    pub auto_apply_rank: Option<i32>,
    pub plan_type: Option<String>,
}
