//! # HTTP Bridge Server
//!
//! Exposes the print pipeline over HTTP so hosts (a POS front-end, a script
//! bridge, a deep-link handler) can submit jobs and poll their status.
//!
//! ## Usage
//!
//! ```bash
//! puente serve --listen 0.0.0.0:8080
//! ```
//!
//! ## Endpoints
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/print/:pdf_id` | Print a service document by token |
//! | `POST /api/print/url` | Print a PDF from a literal URL |
//! | `GET /api/status`, `POST /api/status/clear` | Job status |
//! | `GET/POST /api/profiles`, `/api/profiles/:id/...` | Profile CRUD, select, test pages |
//! | `GET/PUT /api/settings` | Default print settings |
//! | `GET /api/preview` | First-page PNG preview |

mod handlers;
mod state;

pub use state::{JobStatus, ServerConfig};

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::PrintError;
use crate::job::PrintJobRunner;
use crate::settings::store::SettingsStore;
use state::AppState;

/// Start the HTTP server.
pub async fn serve(config: ServerConfig) -> Result<(), PrintError> {
    let store = SettingsStore::load(&config.settings_path)?;
    let runner = PrintJobRunner::new(&config.service_base)?;
    let app_state = Arc::new(AppState::new(config.clone(), store, runner));

    let app = Router::new()
        .route("/api/print/url", post(handlers::print::print_url))
        .route("/api/print/:pdf_id", post(handlers::print::print_document))
        .route("/api/status", get(handlers::status::current))
        .route("/api/status/clear", post(handlers::status::clear))
        .route(
            "/api/profiles",
            get(handlers::profiles::list).post(handlers::profiles::upsert),
        )
        .route("/api/profiles/:id", delete(handlers::profiles::remove))
        .route("/api/profiles/:id/select", post(handlers::profiles::select))
        .route("/api/profiles/:id/test", post(handlers::profiles::test_page))
        .route(
            "/api/profiles/:id/test-graphic",
            post(handlers::profiles::graphic_test_page),
        )
        .route(
            "/api/settings",
            get(handlers::profiles::defaults).put(handlers::profiles::update_defaults),
        )
        .route("/api/preview", get(handlers::print::preview))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    info!(listen = %config.listen_addr, service = %config.service_base, "print bridge starting");

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            PrintError::Connection(format!("Failed to bind to {}: {e}", config.listen_addr))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| PrintError::Connection(format!("Server error: {e}")))?;

    Ok(())
}
