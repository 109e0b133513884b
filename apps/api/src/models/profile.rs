#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Candidate profile as produced by onboarding. Read-only input to matching.
///
/// `sector` may hold the literal string "null" — a known data-entry quirk from
/// the onboarding form. The pipeline maps it to `None` before scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub target_roles: Vec<String>,
    pub cv_skills: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub experience_level: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub job_type: Option<String>,
    pub sector: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserProfileRow {
    pub user_id: Uuid,
    pub target_roles: Option<Vec<String>>,
    pub cv_skills: Option<Vec<String>>,
    pub preferred_locations: Option<Vec<String>>,
    pub experience_level: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub job_type: Option<String>,
    pub sector: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfileRow> for UserProfile {
    fn from(row: UserProfileRow) -> Self {
        UserProfile {
            user_id: row.user_id,
            target_roles: row.target_roles.unwrap_or_default(),
            cv_skills: row.cv_skills.unwrap_or_default(),
            preferred_locations: row.preferred_locations.unwrap_or_default(),
            experience_level: row.experience_level,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            job_type: row.job_type,
            sector: row.sector,
        }
    }
}

impl UserProfile {
    /// Profiles with neither target roles nor CV skills carry nothing to
    /// match against and are skipped by the server pipeline.
    pub fn is_matchable(&self) -> bool {
        !self.target_roles.is_empty() || !self.cv_skills.is_empty()
    }
}
