use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::orchestrator::{score_job_list, ScoredJob, SortMode};
use crate::models::job::{JobRecord, JobRow};
use crate::models::profile::{UserProfile, UserProfileRow};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Deserialize)]
pub struct MatchListQuery {
    /// Absent for anonymous visitors; matching is skipped entirely for them.
    pub user_id: Option<Uuid>,
    /// "score" (default) or "recent".
    pub sort: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct MatchListResponse {
    pub jobs: Vec<ScoredJob>,
}

/// GET /api/v1/matches
/// Returns the current job page with per-job match scores, served from the
/// per-user cache where possible.
pub async fn handle_get_matches(
    State(state): State<AppState>,
    Query(params): Query<MatchListQuery>,
) -> Result<Json<MatchListResponse>, AppError> {
    let sort = match params.sort.as_deref() {
        None | Some("score") => SortMode::MatchScore,
        Some("recent") => SortMode::Recency,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Unknown sort mode '{other}' (expected 'score' or 'recent')"
            )))
        }
    };
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 200);

    let rows: Vec<JobRow> =
        sqlx::query_as("SELECT * FROM jobs ORDER BY posted_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(&state.db)
            .await?;
    let jobs: Vec<JobRecord> = rows.into_iter().map(Into::into).collect();

    let profile: Option<UserProfile> = match params.user_id {
        Some(user_id) => {
            sqlx::query_as::<_, UserProfileRow>(
                "SELECT * FROM user_profiles WHERE user_id = $1",
            )
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?
            .map(Into::into)
        }
        None => None,
    };

    let scored = score_job_list(state.cache.as_ref(), profile.as_ref(), jobs, sort).await;
    Ok(Json(MatchListResponse { jobs: scored }))
}
