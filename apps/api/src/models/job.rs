use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A job posting's location. Older listings store a free string; newer ones a
/// structured object with an explicit remote flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Structured {
        city: Option<String>,
        state: Option<String>,
        country: Option<String>,
        #[serde(default)]
        remote: bool,
    },
    Freeform(String),
}

/// Salary band as stored on the listing. Bounds are kept as raw JSON values
/// because ingestion writes both numbers and strings like "55,000".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub period: Option<String>,
    pub currency: Option<String>,
}

/// How applicants reach the employer for this listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationChannel {
    pub method: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub phone: Option<String>,
}

/// A job listing as consumed by the match engine. Read-only here; ingestion
/// owns writes, so the pipeline re-reads the row at score time rather than
/// trusting a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    /// May itself be a comma-joined multi-role string.
    pub role: String,
    pub related_roles: Vec<String>,
    pub ai_enhanced_roles: Vec<String>,
    pub skills_required: Vec<String>,
    pub ai_enhanced_skills: Vec<String>,
    pub location: Option<Location>,
    pub experience_level: Option<String>,
    pub salary_range: Option<SalaryRange>,
    pub employment_type: Option<String>,
    pub sector: Option<String>,
    pub application: Option<ApplicationChannel>,
    pub posted_at: DateTime<Utc>,
}

/// Raw `jobs` row. JSONB columns come back through `sqlx::types::Json` and are
/// converted once, here, so scoring code never probes loose `Value`s.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub role: String,
    pub related_roles: Option<Vec<String>>,
    pub ai_enhanced_roles: Option<Vec<String>>,
    pub skills_required: Option<Vec<String>>,
    pub ai_enhanced_skills: Option<Vec<String>>,
    pub location: Option<Json<Location>>,
    pub experience_level: Option<String>,
    pub salary_range: Option<Json<SalaryRange>>,
    pub employment_type: Option<String>,
    pub sector: Option<String>,
    pub application: Option<Json<ApplicationChannel>>,
    pub posted_at: DateTime<Utc>,
}

impl From<JobRow> for JobRecord {
    fn from(row: JobRow) -> Self {
        JobRecord {
            id: row.id,
            role: row.role,
            related_roles: row.related_roles.unwrap_or_default(),
            ai_enhanced_roles: row.ai_enhanced_roles.unwrap_or_default(),
            skills_required: row.skills_required.unwrap_or_default(),
            ai_enhanced_skills: row.ai_enhanced_skills.unwrap_or_default(),
            location: row.location.map(|j| j.0),
            experience_level: row.experience_level,
            salary_range: row.salary_range.map(|j| j.0),
            employment_type: row.employment_type,
            sector: row.sector,
            application: row.application.map(|j| j.0),
            posted_at: row.posted_at,
        }
    }
}
