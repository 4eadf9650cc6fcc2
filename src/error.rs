//! # Error Types
//!
//! This module defines the error type used throughout the puente crate.
//!
//! Every variant carries a short, display-ready message: terminal job states
//! surface these strings directly to the caller, so no stack traces or
//! internal identifiers belong in them.

use thiserror::Error;

/// Main error type for print-bridge operations.
#[derive(Debug, Error)]
pub enum PrintError {
    /// A configured command string contains a token that is not a hex byte.
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    /// A caller-supplied parameter is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The PDF could not be decoded or its first page rendered.
    #[error("Render error: {0}")]
    Render(String),

    /// Fetching the source document failed (network or non-2xx response).
    #[error("Download error: {0}")]
    Download(String),

    /// No Bluetooth adapter/radio is present on this host.
    #[error("Bluetooth unavailable: {0}")]
    TransportUnavailable(String),

    /// The process lacks the OS-level grant needed to reach the printer.
    /// The one condition a caller may remediate and retry.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Socket connect or write failure while talking to the printer.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Required configuration is missing (typically the printer address).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
