use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipeline::{run_job_match_pipeline, PipelineSummary};
use crate::state::AppState;

/// POST /api/v1/jobs/:id/match
/// Fired by job ingestion when a listing is inserted. Scores every matchable
/// profile against the new job and persists qualifying results.
pub async fn handle_job_match_trigger(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<PipelineSummary>, AppError> {
    let summary =
        run_job_match_pipeline(&state.db, &state.matches, &state.subscriptions, job_id).await?;
    Ok(Json(summary))
}
