use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::notify::{run_daily_sweep, SweepSummary};
use crate::state::AppState;

/// POST /api/v1/notifications/sweep
/// Manual trigger for the daily sweep; the scheduled task calls the same
/// code path.
pub async fn handle_sweep_trigger(
    State(state): State<AppState>,
) -> Result<Json<SweepSummary>, AppError> {
    let summary = run_daily_sweep(&state.db, state.push.as_ref()).await?;
    Ok(Json(summary))
}
