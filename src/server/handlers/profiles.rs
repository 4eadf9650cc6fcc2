//! Printer profile and settings handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use super::super::state::AppState;
use crate::error::PrintError;
use crate::job::{self, PrintReport};
use crate::protocol::hex;
use crate::settings::{
    PrintMode, PrintSettings, PrinterProfile, PrinterProfileType, PrinterType,
};

/// GET /api/profiles — list saved printer profiles.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<PrinterProfile>> {
    Json(state.store.read().await.printers().to_vec())
}

/// Request body for creating or updating a profile. Omitting `id` creates a
/// new profile.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpsertProfileRequest {
    pub id: Option<String>,
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub printer_type: PrinterType,
    pub print_mode: PrintMode,
    pub print_width_mm: u32,
    pub print_resolution_dpi: u32,
    pub initial_commands: String,
    pub cutter_commands: String,
    pub drawer_commands: String,
    pub graphic_test_url: String,
    pub profile_type: PrinterProfileType,
    /// Whether the profile becomes the selected printer (default true).
    pub select: bool,
}

impl Default for UpsertProfileRequest {
    fn default() -> Self {
        let defaults = PrintSettings::default();
        Self {
            id: None,
            name: String::new(),
            address: String::new(),
            printer_type: PrinterType::Bluetooth,
            print_mode: defaults.print_mode,
            print_width_mm: defaults.print_width_mm,
            print_resolution_dpi: defaults.print_resolution_dpi,
            initial_commands: defaults.initial_commands,
            cutter_commands: defaults.cutter_commands,
            drawer_commands: defaults.drawer_commands,
            graphic_test_url: String::new(),
            profile_type: PrinterProfileType::default(),
            select: true,
        }
    }
}

/// POST /api/profiles — create or update a profile.
pub async fn upsert(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpsertProfileRequest>,
) -> Result<Json<PrinterProfile>, (StatusCode, String)> {
    if request.name.trim().is_empty() || request.address.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Profile name and address are required.".to_string(),
        ));
    }
    // Reject command strings that would only fail later, mid-job.
    for commands in [
        &request.initial_commands,
        &request.cutter_commands,
        &request.drawer_commands,
    ] {
        if let Err(e) = hex::parse(commands) {
            return Err((StatusCode::BAD_REQUEST, e.to_string()));
        }
    }

    let profile = PrinterProfile {
        id: request
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        name: request.name,
        address: request.address,
        printer_type: request.printer_type,
        print_mode: request.print_mode,
        print_width_mm: request.print_width_mm,
        print_resolution_dpi: request.print_resolution_dpi,
        initial_commands: request.initial_commands,
        cutter_commands: request.cutter_commands,
        drawer_commands: request.drawer_commands,
        graphic_test_url: request.graphic_test_url,
        profile_type: request.profile_type,
    };

    let mut store = state.store.write().await;
    store.upsert_printer(profile.clone(), request.select);
    store.save().map_err(internal)?;
    Ok(Json(profile))
}

/// POST /api/profiles/:id/select — make a stored profile the active printer.
pub async fn select(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut store = state.store.write().await;
    if !store.select_printer(&id) {
        return Err((StatusCode::NOT_FOUND, format!("No profile with id {id}")));
    }
    store.save().map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/profiles/:id — remove a stored profile.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let mut store = state.store.write().await;
    if !store.delete_printer(&id) {
        return Err((StatusCode::NOT_FOUND, format!("No profile with id {id}")));
    }
    store.save().map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/profiles/:id/test — print the plain-text test page.
pub async fn test_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PrintReport>, (StatusCode, String)> {
    let (name, address) = {
        let store = state.store.read().await;
        let profile = store
            .find_printer(&id)
            .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No profile with id {id}")))?;
        (profile.name.clone(), profile.address.clone())
    };

    let result = tokio::task::spawn_blocking(move || job::print_test_page(&name, &address))
        .await
        .map_err(|e| internal_from(format!("Task error: {e}")))?;
    Ok(Json(report(result)))
}

/// POST /api/profiles/:id/test-graphic — download and print the profile's
/// sample PDF.
pub async fn graphic_test_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PrintReport>, (StatusCode, String)> {
    let (settings, name, address, url) = {
        let store = state.store.read().await;
        let profile = store
            .find_printer(&id)
            .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No profile with id {id}")))?;
        if profile.graphic_test_url.trim().is_empty() {
            return Err((
                StatusCode::BAD_REQUEST,
                "Profile has no graphic test URL.".to_string(),
            ));
        }
        (
            profile.settings(),
            profile.name.clone(),
            profile.address.clone(),
            profile.graphic_test_url.clone(),
        )
    };

    let app = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        app.runner
            .print_graphic_test_page(&settings, &name, &address, &url)
    })
    .await
    .map_err(|e| internal_from(format!("Task error: {e}")))?;
    Ok(Json(report(result)))
}

/// GET /api/settings — the stored default settings.
pub async fn defaults(State(state): State<Arc<AppState>>) -> Json<PrintSettings> {
    Json(state.store.read().await.settings())
}

/// PUT /api/settings — replace the stored default settings.
pub async fn update_defaults(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<PrintSettings>,
) -> Result<Json<PrintSettings>, (StatusCode, String)> {
    for commands in [
        &settings.initial_commands,
        &settings.cutter_commands,
        &settings.drawer_commands,
    ] {
        if let Err(e) = hex::parse(commands) {
            return Err((StatusCode::BAD_REQUEST, e.to_string()));
        }
    }

    let mut store = state.store.write().await;
    store.set_defaults(settings.clone());
    store.save().map_err(internal)?;
    Ok(Json(settings))
}

fn report(result: Result<(), PrintError>) -> PrintReport {
    match result {
        Ok(()) => PrintReport {
            success: true,
            message: "Test page sent.".to_string(),
        },
        Err(e) => PrintReport {
            success: false,
            message: e.to_string(),
        },
    }
}

fn internal(e: PrintError) -> (StatusCode, String) {
    internal_from(e.to_string())
}

fn internal_from(message: String) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, message)
}
