//! # Bluetooth RFCOMM Transport
//!
//! Sends command chunks to a paired printer over the Bluetooth Serial Port
//! Profile. Printers advertise SPP under the well-known service UUID
//! `00001101-0000-1000-8000-00805F9B34FB`; on Linux the kernel exposes the
//! resulting serial channel as an `/dev/rfcommN` device node.
//!
//! ## Address Resolution
//!
//! `print()` accepts either form:
//!
//! - a hardware address (`00:11:62:AA:BB:CC`) — resolved to an existing
//!   RFCOMM binding via `/proc/net/rfcomm` (falling back to `rfcomm -a`),
//!   or bound fresh on SPP channel 1 when none exists
//! - a literal device path (`/dev/rfcomm0`) — used directly
//!
//! Any in-progress discovery scan is cancelled first; some stacks refuse a
//! reliable connect while scanning.
//!
//! ## TTY Configuration
//!
//! The device node is opened write-only and switched to raw mode: no output
//! post-processing, no echo, no canonical buffering, 8-bit characters, and —
//! critically — no XON/XOFF flow control, since 0x11/0x13 occur freely in
//! raster data.
//!
//! ## Write Pacing
//!
//! RFCOMM buffers are shallow. Large blocks are written in 4KB slices with a
//! short delay between slices so the printer can drain.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::PrintError;

/// Serial Port Profile service UUID printers advertise.
pub const SPP_UUID: &str = "00001101-0000-1000-8000-00805F9B34FB";

/// RFCOMM channel carrying SPP on receipt printers.
const SPP_CHANNEL: u8 = 1;

/// Slice size for paced writes.
const WRITE_CHUNK_SIZE: usize = 4096;

/// Delay between paced write slices.
const WRITE_CHUNK_DELAY_MS: u64 = 2;

/// How long to wait for a freshly bound device node to appear.
const BIND_SETTLE_MS: u64 = 500;

/// Stateless RFCOMM printer client.
pub struct BluetoothTransport;

impl BluetoothTransport {
    /// Stream `chunks` to the printer at `address` (MAC or device path).
    ///
    /// Fails with [`PrintError::TransportUnavailable`] when the host has no
    /// Bluetooth adapter, [`PrintError::PermissionDenied`] when the device
    /// node or binding is not accessible, and [`PrintError::Connection`] for
    /// resolution or write failures. The device handle is always closed;
    /// close errors are swallowed.
    pub fn print(address: &str, chunks: &[Vec<u8>]) -> Result<(), PrintError> {
        if !adapter_available() {
            return Err(PrintError::TransportUnavailable(
                "Bluetooth adapter not available".to_string(),
            ));
        }

        cancel_discovery();

        let device = resolve_device(address)?;
        debug!(address, device = %device, "bluetooth transport resolved device");

        let mut port = open_raw(&device)?;
        let result = write_paced(&mut port, chunks);
        drop(port); // best-effort close
        result
    }
}

/// Whether the host has any Bluetooth adapter.
#[cfg(unix)]
pub fn adapter_available() -> bool {
    fs::read_dir("/sys/class/bluetooth")
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn adapter_available() -> bool {
    false
}

/// Whether the process can plausibly open an RFCOMM channel: root, or an
/// existing `/dev/rfcommN` node it may write to.
#[cfg(unix)]
pub fn permission_granted() -> bool {
    if unsafe { libc::geteuid() } == 0 {
        return true;
    }
    rfcomm_nodes().iter().any(|node| {
        let Ok(path) = std::ffi::CString::new(node.as_str()) else {
            return false;
        };
        unsafe { libc::access(path.as_ptr(), libc::W_OK) == 0 }
    })
}

#[cfg(not(unix))]
pub fn permission_granted() -> bool {
    false
}

/// Validate a Bluetooth hardware address (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Stop any in-progress discovery scan. Best-effort: a missing
/// `bluetoothctl` or a failed command never fails the job.
fn cancel_discovery() {
    match Command::new("bluetoothctl").args(["scan", "off"]).output() {
        Ok(output) if !output.status.success() => {
            debug!("bluetoothctl scan off returned nonzero (no scan running?)");
        }
        Ok(_) => {}
        Err(e) => warn!("could not run bluetoothctl: {e}"),
    }
}

/// Map a printer address to an openable device path.
fn resolve_device(address: &str) -> Result<String, PrintError> {
    if address.starts_with('/') {
        return Ok(address.to_string());
    }
    if !is_valid_mac(address) {
        return Err(PrintError::Connection(format!(
            "Not a Bluetooth address or device path: {address}"
        )));
    }
    if let Some(device) = find_rfcomm_for_mac(address) {
        return Ok(device);
    }
    bind_rfcomm(address)
}

/// Find an existing RFCOMM device bound to `mac`, checking
/// `/proc/net/rfcomm` first and the `rfcomm -a` tool second.
#[cfg(unix)]
fn find_rfcomm_for_mac(mac: &str) -> Option<String> {
    let mac_upper = mac.to_uppercase();

    // Format: "rfcomm0: XX:XX:XX:XX:XX:XX channel N ..."
    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm")
        && let Some(device) = device_from_listing(&contents, &mac_upper)
    {
        return Some(device);
    }

    let output = Command::new("rfcomm").arg("-a").output().ok()?;
    device_from_listing(&String::from_utf8_lossy(&output.stdout), &mac_upper)
}

#[cfg(not(unix))]
fn find_rfcomm_for_mac(_mac: &str) -> Option<String> {
    None
}

/// Pick the device name out of an rfcomm listing line mentioning `mac`.
fn device_from_listing(listing: &str, mac_upper: &str) -> Option<String> {
    for line in listing.lines() {
        if !line.to_uppercase().contains(mac_upper) {
            continue;
        }
        if let Some(name) = line.split(':').next() {
            let path = format!("/dev/{}", name.trim());
            if Path::new(&path).exists() {
                return Some(path);
            }
        }
    }
    None
}

/// Bind a fresh RFCOMM device for `mac` on the SPP channel.
#[cfg(unix)]
fn bind_rfcomm(mac: &str) -> Result<String, PrintError> {
    let mac_upper = mac.to_uppercase();
    let index = (0u8..32)
        .find(|i| !Path::new(&format!("/dev/rfcomm{i}")).exists())
        .ok_or_else(|| PrintError::Connection("No free rfcomm device".to_string()))?;
    let device = format!("/dev/rfcomm{index}");

    let output = Command::new("rfcomm")
        .args([
            "bind",
            &index.to_string(),
            &mac_upper,
            &SPP_CHANNEL.to_string(),
        ])
        .output()
        .map_err(|e| PrintError::Connection(format!("Failed to run rfcomm bind: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.contains("not permitted") || stderr.contains("denied") {
            return Err(PrintError::PermissionDenied(
                "Bluetooth permission required (rfcomm bind needs root)".to_string(),
            ));
        }
        return Err(PrintError::Connection(format!("rfcomm bind failed: {stderr}")));
    }

    thread::sleep(Duration::from_millis(BIND_SETTLE_MS));
    if !Path::new(&device).exists() {
        return Err(PrintError::Connection(format!("{device} was not created")));
    }
    Ok(device)
}

#[cfg(not(unix))]
fn bind_rfcomm(_mac: &str) -> Result<String, PrintError> {
    Err(PrintError::TransportUnavailable(
        "RFCOMM binding not supported on this platform".to_string(),
    ))
}

/// Open the device node write-only and switch it to raw mode.
fn open_raw(device: &str) -> Result<File, PrintError> {
    let file = OpenOptions::new().write(true).open(device).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            PrintError::PermissionDenied(format!("No write access to {device}"))
        } else {
            PrintError::Connection(format!("Failed to open {device}: {e}"))
        }
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        configure_tty_raw(file.as_raw_fd())?;
    }

    Ok(file)
}

/// Disable every transformation between us and the wire: input processing
/// (including XON/XOFF), output post-processing, echo, canonical mode;
/// 8-bit characters, no parity.
#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> Result<(), PrintError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
        return Err(PrintError::Connection(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
        return Err(PrintError::Connection(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    Ok(())
}

/// Write chunks with 4KB pacing slices, flushing after each chunk.
fn write_paced(port: &mut File, chunks: &[Vec<u8>]) -> Result<(), PrintError> {
    for chunk in chunks {
        if chunk.is_empty() {
            continue;
        }
        for slice in chunk.chunks(WRITE_CHUNK_SIZE) {
            port.write_all(slice)
                .map_err(|e| PrintError::Connection(format!("Write failed: {e}")))?;
            if chunk.len() > WRITE_CHUNK_SIZE {
                thread::sleep(Duration::from_millis(WRITE_CHUNK_DELAY_MS));
            }
        }
        port.flush()
            .map_err(|e| PrintError::Connection(format!("Flush failed: {e}")))?;
    }
    port.flush()
        .map_err(|e| PrintError::Connection(format!("Flush failed: {e}")))
}

/// All existing `/dev/rfcommN` nodes.
#[cfg(unix)]
fn rfcomm_nodes() -> Vec<String> {
    let Ok(entries) = fs::read_dir("/dev") else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with("rfcomm"))
        .map(|name| format!("/dev/{name}"))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mac_addresses() {
        assert!(is_valid_mac("00:11:22:33:44:55"));
        assert!(is_valid_mac("AA:BB:CC:DD:EE:FF"));
        assert!(is_valid_mac("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn test_invalid_mac_addresses() {
        assert!(!is_valid_mac("00:11:22:33:44")); // too short
        assert!(!is_valid_mac("00:11:22:33:44:55:66")); // too long
        assert!(!is_valid_mac("00-11-22-33-44-55")); // wrong separator
        assert!(!is_valid_mac("GG:HH:II:JJ:KK:LL")); // not hex
        assert!(!is_valid_mac(""));
    }

    #[test]
    fn test_device_from_listing() {
        let listing = "rfcomm0: 00:11:62:AA:BB:CC channel 1 clean\n";
        // Only matches when the node actually exists, which it won't here.
        assert_eq!(device_from_listing(listing, "00:11:62:AA:BB:CC"), None);
        assert_eq!(device_from_listing("", "00:11:62:AA:BB:CC"), None);
    }

    #[test]
    fn test_resolve_rejects_garbage_address() {
        let result = resolve_device("not-an-address");
        assert!(matches!(result, Err(PrintError::Connection(_))));
    }

    #[test]
    fn test_resolve_passes_device_paths_through() {
        assert_eq!(
            resolve_device("/dev/rfcomm3").unwrap(),
            "/dev/rfcomm3".to_string()
        );
    }

    #[test]
    fn test_spp_uuid() {
        assert_eq!(SPP_UUID, "00001101-0000-1000-8000-00805F9B34FB");
    }

    // Writing to a live printer requires hardware; the write path is
    // exercised against plain files/sockets in the integration tests.
}
