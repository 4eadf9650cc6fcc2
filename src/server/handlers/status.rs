//! Job status handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use super::super::state::{AppState, JobStatus};

/// Handle GET /api/status — the last observed job status.
pub async fn current(State(state): State<Arc<AppState>>) -> Json<JobStatus> {
    Json(state.status.lock().unwrap().clone())
}

/// Handle POST /api/status/clear — reset to idle.
pub async fn clear(State(state): State<Arc<AppState>>) -> Json<JobStatus> {
    let mut status = state.status.lock().unwrap();
    *status = JobStatus::default();
    Json(status.clone())
}
