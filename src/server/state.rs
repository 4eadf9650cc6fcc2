//! Server state and configuration.

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::PrintError;
use crate::job::{PrintJobRunner, PrintStage, PrintStatus};
use crate::settings::store::SettingsStore;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Print-service base URL for id-based PDF retrieval
    pub service_base: String,
    /// Settings store location
    pub settings_path: PathBuf,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub store: RwLock<SettingsStore>,
    pub runner: PrintJobRunner,
    /// At most one job in flight; overlapping submissions are rejected so
    /// two jobs never interleave on one printer.
    pub busy: AtomicBool,
    /// Last observed job status. Only the reducer loop in the print
    /// handlers writes it while a job runs.
    pub status: Mutex<JobStatus>,
}

impl AppState {
    pub fn new(config: ServerConfig, store: SettingsStore, runner: PrintJobRunner) -> Self {
        Self {
            config,
            store: RwLock::new(store),
            runner,
            busy: AtomicBool::new(false),
            status: Mutex::new(JobStatus::default()),
        }
    }
}

/// Job status surfaced to the host UI: the four pipeline stages folded into
/// the simplified status levels, plus a display message.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub status: PrintStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_id: Option<String>,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self {
            status: PrintStatus::Idle,
            message: String::new(),
            pdf_id: None,
        }
    }
}

impl JobStatus {
    /// Fold a stage transition into the simplified status.
    pub fn apply_stage(&mut self, stage: PrintStage) {
        match stage {
            PrintStage::Downloading => {
                self.status = PrintStatus::Downloading;
                self.message = "Downloading PDF...".to_string();
            }
            PrintStage::Rendering => {
                self.status = PrintStatus::Printing;
                self.message = "Preparing page...".to_string();
            }
            PrintStage::Connecting => {
                self.status = PrintStatus::Printing;
                self.message = "Connecting to printer...".to_string();
            }
            PrintStage::Sending => {
                self.status = PrintStatus::Printing;
                self.message = "Sending to printer...".to_string();
            }
        }
    }

    /// Fold the job outcome into a terminal status.
    pub fn apply_result(&mut self, result: &Result<(), PrintError>) {
        match result {
            Ok(()) => {
                self.status = PrintStatus::Success;
                self.message = "Print job sent.".to_string();
            }
            Err(PrintError::PermissionDenied(message)) => {
                self.status = PrintStatus::WaitingForPermission;
                self.message = message.clone();
            }
            Err(e) => {
                self.status = PrintStatus::Error;
                self.message = e.to_string();
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_folding() {
        let mut status = JobStatus::default();
        status.apply_stage(PrintStage::Downloading);
        assert_eq!(status.status, PrintStatus::Downloading);
        status.apply_stage(PrintStage::Rendering);
        assert_eq!(status.status, PrintStatus::Printing);
        status.apply_stage(PrintStage::Sending);
        assert_eq!(status.status, PrintStatus::Printing);
    }

    #[test]
    fn test_result_folding() {
        let mut status = JobStatus::default();
        status.apply_result(&Ok(()));
        assert_eq!(status.status, PrintStatus::Success);

        status.apply_result(&Err(PrintError::PermissionDenied(
            "Bluetooth permission required.".to_string(),
        )));
        assert_eq!(status.status, PrintStatus::WaitingForPermission);

        status.apply_result(&Err(PrintError::Configuration(
            "No printer configured.".to_string(),
        )));
        assert_eq!(status.status, PrintStatus::Error);
        assert!(status.message.contains("No printer configured."));
    }
}
