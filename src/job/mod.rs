//! # Print Jobs
//!
//! The staged pipeline turning a print request into bytes on the wire:
//!
//! ```text
//! source token ─► download ─► render ─► rasterize ─► connect ─► send
//!                (reqwest)    (mupdf)   (GS v 0)     (transport dispatch)
//! ```
//!
//! - [`download`]: PDF retrieval by id or literal URL
//! - [`runner`]: the orchestrator enforcing preconditions and reporting
//!   stage transitions
//!
//! A job exists only for the duration of one `run_*` call, is never retried
//! automatically, and reports exactly one terminal outcome.

pub mod download;
pub mod runner;

use std::fmt;

use serde::Serialize;

pub use download::PdfDownloader;
pub use runner::{BluetoothAccess, PrintJobRunner, SystemBluetooth, print_test_page};

/// Pipeline stages, reported once each through the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintStage {
    Downloading,
    Rendering,
    Connecting,
    Sending,
}

impl fmt::Display for PrintStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Downloading => "Downloading",
            Self::Rendering => "Rendering",
            Self::Connecting => "Connecting",
            Self::Sending => "Sending",
        };
        f.write_str(label)
    }
}

/// Simplified job status the host surfaces to users.
///
/// `WaitingForPermission` is deliberately not an error: the host can obtain
/// the missing Bluetooth grant and re-submit the same job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintStatus {
    Idle,
    WaitingForPermission,
    Downloading,
    Printing,
    Success,
    Error,
}

/// Outcome summary for fire-and-forget operations (test pages).
#[derive(Debug, Clone, Serialize)]
pub struct PrintReport {
    pub success: bool,
    pub message: String,
}
