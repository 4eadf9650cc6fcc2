//! # Printer Transport Layer
//!
//! Communication backends for sending encoded command chunks to printers.
//!
//! ## Available Transports
//!
//! - [`bluetooth`]: RFCOMM serial channel to a paired printer (Linux)
//! - [`ethernet`]: raw TCP to port 9100
//!
//! ## Shared Contract
//!
//! Each transport exposes `print(address, chunks)`: open a connection, write
//! every non-empty chunk in order with a flush after each, flush once more,
//! then close unconditionally. Close errors are swallowed — they signal
//! cleanup ambiguity, not undelivered data. Write errors propagate.
//!
//! Transports hold no state; construct-and-call is safe from any thread.

pub mod bluetooth;
pub mod ethernet;

use std::io::Write;

pub use bluetooth::BluetoothTransport;
pub use ethernet::EthernetTransport;

use crate::error::PrintError;

/// Decide whether a print request targets an Ethernet printer.
///
/// Explicit type strings win; otherwise the address shape decides: a colon
/// suggests a Bluetooth MAC, so only colon-free addresses default to
/// Ethernet. The heuristic misreads IPv6 literals — kept as-is for
/// compatibility with existing callers.
///
/// ```
/// use puente::transport::is_ethernet;
///
/// assert!(is_ethernet("ethernet", "00:11:22:33:44:55"));
/// assert!(!is_ethernet("bluetooth", "192.168.1.50"));
/// assert!(is_ethernet("", "192.168.1.50"));
/// assert!(!is_ethernet("", "00:11:22:33:44:55"));
/// ```
pub fn is_ethernet(kind: &str, address: &str) -> bool {
    let normalized = kind.trim().to_lowercase();
    match normalized.as_str() {
        "ethernet" | "network" | "ip" | "ethernet printer" => true,
        "bluetooth" | "bt" => false,
        _ => !address.contains(':'),
    }
}

/// Route `chunks` to the transport selected by [`is_ethernet`].
pub fn dispatch(kind: &str, address: &str, chunks: &[Vec<u8>]) -> Result<(), PrintError> {
    if is_ethernet(kind, address) {
        EthernetTransport::print(address, chunks)
    } else {
        BluetoothTransport::print(address, chunks)
    }
}

/// Write every non-empty chunk with a flush after each, then a final flush.
pub(crate) fn write_chunks<W: Write>(writer: &mut W, chunks: &[Vec<u8>]) -> Result<(), PrintError> {
    for chunk in chunks {
        if chunk.is_empty() {
            continue;
        }
        writer
            .write_all(chunk)
            .map_err(|e| PrintError::Connection(format!("Write failed: {e}")))?;
        writer
            .flush()
            .map_err(|e| PrintError::Connection(format!("Flush failed: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| PrintError::Connection(format!("Flush failed: {e}")))
}

// ============================================================================
// TESTS
// ============================================================================
