//! Print job handlers.
//!
//! Jobs run on a blocking worker thread; stage transitions flow over a
//! channel into the single reducer loop below, which owns all writes to the
//! shared [`JobStatus`]. A busy flag rejects overlapping submissions so two
//! jobs can never interleave on one printer.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use super::super::state::{AppState, JobStatus};
use crate::error::PrintError;
use crate::job::{PrintStage, PrintStatus};
use crate::settings::PrinterProfileType;
use crate::transport::is_ethernet;

enum JobEvent {
    Stage(PrintStage),
    Done(Result<(), PrintError>),
}

/// Handle POST /api/print/:pdf_id — print a service document to the
/// configured printer.
pub async fn print_document(
    State(state): State<Arc<AppState>>,
    Path(pdf_id): Path<String>,
) -> Response {
    if pdf_id.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Document id is required.");
    }
    let Some(guard) = BusyGuard::acquire(&state) else {
        return busy_response();
    };

    let settings = state.store.read().await.settings();
    let app = state.clone();
    let id = pdf_id.clone();
    let outcome = execute_job(&state, Some(pdf_id), move |progress| {
        app.runner.run_for_document(&id, &settings, progress)
    })
    .await;

    drop(guard);
    outcome_response(outcome)
}

/// Request body for the URL print path (the script-bridge contract).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlPrintRequest {
    pub address: String,
    pub pdf_url: String,
    /// Transport/profile hint ("ethernet", "bluetooth", "receipt", ...).
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Handle POST /api/print/url — print a PDF from a literal URL.
pub async fn print_url(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UrlPrintRequest>,
) -> Response {
    if request.address.trim().is_empty() || request.pdf_url.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Printer address and PDF URL are required.",
        );
    }
    let Some(guard) = BusyGuard::acquire(&state) else {
        return busy_response();
    };

    // Saved profiles override the defaults when one matches the target
    // address and requested profile type.
    let profile_type = PrinterProfileType::parse_or_default(&request.kind);
    let settings = {
        let store = state.store.read().await;
        store
            .resolve_for_address(&request.address, profile_type)
            .map(|profile| profile.settings())
            .unwrap_or_else(|| store.settings())
    };

    let app = state.clone();
    let address = request.address.clone();
    let kind = request.kind.clone();
    let pdf_url = request.pdf_url.clone();
    let outcome = execute_job(&state, None, move |progress| {
        app.runner
            .run_for_url(&address, &kind, &pdf_url, &settings, progress)
    })
    .await;

    if outcome.status == PrintStatus::Success && is_ethernet(&request.kind, &request.address) {
        let mut store = state.store.write().await;
        store.remember_ethernet_ip(&request.address);
        if let Err(e) = store.save() {
            tracing::warn!("could not persist last ethernet address: {e}");
        }
    }

    drop(guard);
    outcome_response(outcome)
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub url: String,
}

/// Handle GET /api/preview?url=… — render the first page as PNG without
/// printing.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PreviewQuery>,
) -> Response {
    let settings = state.store.read().await.settings();
    let app = state.clone();

    let result = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, PrintError> {
        let image = app.runner.render_preview(&settings, &query.url)?;
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| PrintError::Render(format!("PNG encoding failed: {e}")))?;
        Ok(png)
    })
    .await;

    match result {
        Ok(Ok(png)) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("Task error: {e}")),
    }
}

/// Run a blocking job on a worker thread and reduce its events into the
/// shared status. Returns the terminal status.
async fn execute_job<F>(state: &Arc<AppState>, pdf_id: Option<String>, job: F) -> JobStatus
where
    F: FnOnce(&mut dyn FnMut(PrintStage)) -> Result<(), PrintError> + Send + 'static,
{
    {
        let mut status = state.status.lock().unwrap();
        *status = JobStatus {
            pdf_id,
            ..JobStatus::default()
        };
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let worker = tokio::task::spawn_blocking(move || {
        let progress_tx = tx.clone();
        let mut on_progress = move |stage: PrintStage| {
            let _ = progress_tx.send(JobEvent::Stage(stage));
        };
        let result = job(&mut on_progress);
        let _ = tx.send(JobEvent::Done(result));
    });

    let mut finished = false;
    while let Some(event) = rx.recv().await {
        let mut status = state.status.lock().unwrap();
        match event {
            JobEvent::Stage(stage) => status.apply_stage(stage),
            JobEvent::Done(result) => {
                status.apply_result(&result);
                finished = true;
            }
        }
        if finished {
            break;
        }
    }
    let _ = worker.await;

    let mut status = state.status.lock().unwrap();
    if !finished {
        status.status = PrintStatus::Error;
        status.message = "Print job aborted.".to_string();
    }
    status.clone()
}

fn outcome_response(outcome: JobStatus) -> Response {
    let code = match outcome.status {
        PrintStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    (code, Json(outcome)).into_response()
}

fn busy_response() -> Response {
    error_response(StatusCode::CONFLICT, "A print job is already running.")
}

fn error_response(code: StatusCode, message: &str) -> Response {
    (
        code,
        Json(serde_json::json!({ "success": false, "error": message })),
    )
        .into_response()
}

/// Releases the busy flag when dropped, so every exit path frees it.
struct BusyGuard {
    state: Arc<AppState>,
}

impl BusyGuard {
    fn acquire(state: &Arc<AppState>) -> Option<Self> {
        if state.busy.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Self {
            state: state.clone(),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.busy.store(false, Ordering::SeqCst);
    }
}
