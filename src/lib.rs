//! # Puente - ESC/POS Print Bridge
//!
//! Puente receives print requests, fetches a PDF, rasterizes its first page,
//! and transmits it to a receipt/label printer over Bluetooth RFCOMM or raw
//! TCP (port 9100) using the ESC/POS command protocol. It provides:
//!
//! - **Protocol implementation**: GS v 0 raster encoding with chunking, hex
//!   command codec for configurable init/cutter/drawer sequences
//! - **Rendering**: first-page PDF rasterization sized to the print head
//! - **Transport**: Bluetooth RFCOMM and raw-TCP backends with a shared
//!   chunk-streaming contract
//! - **Orchestration**: a staged job pipeline with progress reporting
//! - **Bridge surfaces**: an HTTP API and a CLI
//!
//! ## Quick Start
//!
//! ```no_run
//! use puente::{
//!     job::{PrintJobRunner, PrintStage},
//!     settings::PrintSettings,
//! };
//!
//! let runner = PrintJobRunner::new("https://pos.example.com")?;
//! let settings = PrintSettings {
//!     printer_address: Some("00:11:62:AA:BB:CC".to_string()),
//!     ..Default::default()
//! };
//!
//! runner.run_for_document("ticket-42", &settings, &mut |stage: PrintStage| {
//!     println!("{stage}...");
//! })?;
//!
//! # Ok::<(), puente::PrintError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS commands, hex codec, raster encoder |
//! | [`render`] | PDF first-page rasterization |
//! | [`transport`] | Bluetooth and Ethernet printer clients |
//! | [`job`] | Download + staged print orchestration |
//! | [`settings`] | Print settings, profiles, persistence |
//! | [`server`] | HTTP bridge API |
//! | [`error`] | Error types |

pub mod error;
pub mod job;
pub mod protocol;
pub mod render;
pub mod server;
pub mod settings;
pub mod transport;

// Re-exports for convenience
pub use error::PrintError;
pub use job::PrintJobRunner;
pub use settings::PrintSettings;
