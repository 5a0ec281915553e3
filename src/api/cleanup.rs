use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::services::SweepSummary;

/// Runs one sweep and reports what it changed.
pub async fn run_cleanup(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SweepSummary>, ApiError> {
    let summary = state.sweeper().run().await?;
    Ok(Json(summary))
}
