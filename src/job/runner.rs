//! # Print Job Orchestrator
//!
//! Composes download, render, raster encoding, and transport dispatch into
//! one staged pipeline. Two named entry points exist because their wire
//! output differs:
//!
//! - [`PrintJobRunner::run_for_document`] — id-based path: one raster block,
//!   drawer-kick appended after the cut
//! - [`PrintJobRunner::run_for_url`] — URL path: chunked raster blocks, no
//!   drawer kick, transport chosen by [`crate::transport::is_ethernet`]
//!
//! Preconditions are checked before any stage runs, so a misconfigured job
//! fails without touching the network. Failures are terminal: callers start
//! a new job rather than retrying a stage. The only caller-remediable
//! failure is a missing Bluetooth grant ([`PrintError::PermissionDenied`]).

use image::RgbaImage;
use tracing::info;

use super::download::PdfDownloader;
use super::PrintStage;
use crate::error::PrintError;
use crate::protocol::{hex, raster};
use crate::render::render_first_page;
use crate::settings::PrintSettings;
use crate::transport::{self, BluetoothTransport, EthernetTransport};

/// Platform probe for Bluetooth preconditions.
///
/// Seam for tests and alternative hosts; [`SystemBluetooth`] queries the
/// actual adapter.
pub trait BluetoothAccess: Send + Sync {
    fn adapter_available(&self) -> bool;
    fn permission_granted(&self) -> bool;
}

/// Probe backed by the host's Bluetooth stack.
pub struct SystemBluetooth;

impl BluetoothAccess for SystemBluetooth {
    fn adapter_available(&self) -> bool {
        transport::bluetooth::adapter_available()
    }

    fn permission_granted(&self) -> bool {
        transport::bluetooth::permission_granted()
    }
}

/// Staged print pipeline. One logical job at a time per instance; callers
/// wanting overlap protection serialize externally (the bridge server holds
/// a busy flag).
pub struct PrintJobRunner {
    downloader: PdfDownloader,
    bluetooth: Box<dyn BluetoothAccess>,
}

impl PrintJobRunner {
    pub fn new(service_base: &str) -> Result<Self, PrintError> {
        Self::with_bluetooth_access(service_base, Box::new(SystemBluetooth))
    }

    pub fn with_bluetooth_access(
        service_base: &str,
        bluetooth: Box<dyn BluetoothAccess>,
    ) -> Result<Self, PrintError> {
        Ok(Self {
            downloader: PdfDownloader::new(service_base)?,
            bluetooth,
        })
    }

    /// Print a PDF identified by its service token to the configured
    /// Bluetooth printer.
    ///
    /// Wire sequence: `[initial] [raster] [cutter] [drawer]`.
    pub fn run_for_document(
        &self,
        pdf_id: &str,
        settings: &PrintSettings,
        on_progress: &mut dyn FnMut(PrintStage),
    ) -> Result<(), PrintError> {
        self.ensure_bluetooth_ready()?;
        let address = configured_address(settings)?;

        on_progress(PrintStage::Downloading);
        let pdf = self.downloader.fetch_document(pdf_id)?;

        on_progress(PrintStage::Rendering);
        let page = render_first_page(&pdf, settings.width_dots())?;
        let raster_block = raster::encode(&page, raster::DEFAULT_THRESHOLD);

        let initial = hex::parse(&settings.initial_commands)?;
        let cutter = hex::parse(&settings.cutter_commands)?;
        let drawer = hex::parse(&settings.drawer_commands)?;

        on_progress(PrintStage::Connecting);
        let chunks = vec![initial, raster_block, cutter, drawer];

        on_progress(PrintStage::Sending);
        info!(pdf_id, address = %address, "sending document print job");
        BluetoothTransport::print(&address, &chunks)
    }

    /// Print a PDF from a literal URL to the printer at `address`, transport
    /// chosen by the `kind` hint and address shape.
    ///
    /// Wire sequence: `[initial] [raster chunks...] [cutter]`.
    pub fn run_for_url(
        &self,
        address: &str,
        kind: &str,
        pdf_url: &str,
        settings: &PrintSettings,
        on_progress: &mut dyn FnMut(PrintStage),
    ) -> Result<(), PrintError> {
        if address.trim().is_empty() {
            return Err(PrintError::Configuration(
                "Printer address is required.".to_string(),
            ));
        }
        if pdf_url.trim().is_empty() {
            return Err(PrintError::Configuration("PDF URL is required.".to_string()));
        }
        if !transport::is_ethernet(kind, address) {
            self.ensure_bluetooth_ready()?;
        }

        on_progress(PrintStage::Downloading);
        let pdf = self.downloader.fetch_url(pdf_url)?;

        on_progress(PrintStage::Rendering);
        let page = render_first_page(&pdf, settings.width_dots())?;
        let raster_chunks = raster::encode_chunked(
            &page,
            raster::DEFAULT_THRESHOLD,
            raster::DEFAULT_MAX_ROWS_PER_CHUNK,
        )?;

        let initial = hex::parse(&settings.initial_commands)?;
        let cutter = hex::parse(&settings.cutter_commands)?;

        let mut chunks = Vec::with_capacity(raster_chunks.len() + 2);
        chunks.push(initial);
        chunks.extend(raster_chunks);
        chunks.push(cutter);

        on_progress(PrintStage::Connecting);
        on_progress(PrintStage::Sending);
        info!(address, pdf_url, "sending url print job");
        transport::dispatch(kind, address, &chunks)
    }

    /// Print the graphic test page: the profile's sample PDF rendered and
    /// sent like a URL job. Dispatches to Ethernet when the profile is named
    /// "Ethernet Printer", to Bluetooth otherwise.
    pub fn print_graphic_test_page(
        &self,
        settings: &PrintSettings,
        name: &str,
        address: &str,
        pdf_url: &str,
    ) -> Result<(), PrintError> {
        let pdf = self.downloader.fetch_url(pdf_url)?;
        let page = render_first_page(&pdf, settings.width_dots())?;
        let raster_chunks = raster::encode_chunked(
            &page,
            raster::DEFAULT_THRESHOLD,
            raster::DEFAULT_MAX_ROWS_PER_CHUNK,
        )?;

        let initial = hex::parse(&settings.initial_commands)?;
        let cutter = hex::parse(&settings.cutter_commands)?;

        let mut chunks = Vec::with_capacity(raster_chunks.len() + 2);
        chunks.push(initial);
        chunks.extend(raster_chunks);
        chunks.push(cutter);

        if name == "Ethernet Printer" {
            EthernetTransport::print(address, &chunks)
        } else {
            BluetoothTransport::print(address, &chunks)
        }
    }

    /// Download and render a PDF without printing — feeds the preview
    /// endpoint.
    pub fn render_preview(
        &self,
        settings: &PrintSettings,
        pdf_url: &str,
    ) -> Result<RgbaImage, PrintError> {
        let pdf = self.downloader.fetch_url(pdf_url)?;
        render_first_page(&pdf, settings.width_dots())
    }

    fn ensure_bluetooth_ready(&self) -> Result<(), PrintError> {
        if !self.bluetooth.adapter_available() {
            return Err(PrintError::TransportUnavailable(
                "Bluetooth is unavailable or disabled.".to_string(),
            ));
        }
        if !self.bluetooth.permission_granted() {
            return Err(PrintError::PermissionDenied(
                "Bluetooth permission required.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Print a plain-text test page: `Receipt <timestamp>`, no init or cut
/// framing. Dispatches by printer name the same way the graphic test does.
pub fn print_test_page(name: &str, address: &str) -> Result<(), PrintError> {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let content = format!("Receipt {timestamp}\n");
    let chunks = vec![content.into_bytes()];

    if name == "Ethernet Printer" {
        EthernetTransport::print(address, &chunks)
    } else {
        BluetoothTransport::print(address, &chunks)
    }
}

fn configured_address(settings: &PrintSettings) -> Result<String, PrintError> {
    settings
        .printer_address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PrintError::Configuration("No printer configured.".to_string()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeBluetooth {
        adapter: bool,
        permission: bool,
    }

    impl BluetoothAccess for FakeBluetooth {
        fn adapter_available(&self) -> bool {
            self.adapter
        }

        fn permission_granted(&self) -> bool {
            self.permission
        }
    }

    fn runner(adapter: bool, permission: bool) -> PrintJobRunner {
        PrintJobRunner::with_bluetooth_access(
            "http://127.0.0.1:1",
            Box::new(FakeBluetooth { adapter, permission }),
        )
        .unwrap()
    }

    fn settings_with_address(address: Option<&str>) -> PrintSettings {
        PrintSettings {
            printer_address: address.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_document_job_without_address_enters_no_stage() {
        let runner = runner(true, true);
        let mut stages = Vec::new();
        let result = runner.run_for_document(
            "abc",
            &settings_with_address(None),
            &mut |stage| stages.push(stage),
        );

        assert!(matches!(result, Err(PrintError::Configuration(_))));
        assert!(stages.is_empty());
    }

    #[test]
    fn test_document_job_blank_address_enters_no_stage() {
        let runner = runner(true, true);
        let mut stages = Vec::new();
        let result = runner.run_for_document(
            "abc",
            &settings_with_address(Some("   ")),
            &mut |stage| stages.push(stage),
        );

        assert!(matches!(result, Err(PrintError::Configuration(_))));
        assert!(stages.is_empty());
    }

    #[test]
    fn test_missing_permission_blocks_before_any_io() {
        let runner = runner(true, false);
        let mut stages = Vec::new();
        let result = runner.run_for_document(
            "abc",
            &settings_with_address(Some("00:11:22:33:44:55")),
            &mut |stage| stages.push(stage),
        );

        assert!(matches!(result, Err(PrintError::PermissionDenied(_))));
        assert!(stages.is_empty());
    }

    #[test]
    fn test_missing_adapter_is_transport_unavailable() {
        let runner = runner(false, false);
        let result = runner.run_for_document(
            "abc",
            &settings_with_address(Some("00:11:22:33:44:55")),
            &mut |_| {},
        );

        assert!(matches!(result, Err(PrintError::TransportUnavailable(_))));
    }

    #[test]
    fn test_url_job_requires_address_and_url() {
        let runner = runner(true, true);
        let settings = PrintSettings::default();

        let result = runner.run_for_url("", "", "http://x/y.pdf", &settings, &mut |_| {});
        assert!(matches!(result, Err(PrintError::Configuration(_))));

        let result = runner.run_for_url("192.168.1.50", "", "  ", &settings, &mut |_| {});
        assert!(matches!(result, Err(PrintError::Configuration(_))));
    }

    #[test]
    fn test_url_job_to_ethernet_skips_bluetooth_preconditions() {
        // No adapter, no permission: an Ethernet-bound job must get past the
        // precondition checks and fail only at download.
        let runner = runner(false, false);
        let mut stages = Vec::new();
        let result = runner.run_for_url(
            "192.168.1.50",
            "",
            "http://127.0.0.1:1/doc.pdf",
            &PrintSettings::default(),
            &mut |stage| stages.push(stage),
        );

        assert!(matches!(result, Err(PrintError::Download(_))));
        assert_eq!(stages, vec![PrintStage::Downloading]);
    }

    #[test]
    fn test_url_job_to_bluetooth_checks_preconditions() {
        let runner = runner(true, false);
        let result = runner.run_for_url(
            "00:11:22:33:44:55",
            "",
            "http://127.0.0.1:1/doc.pdf",
            &PrintSettings::default(),
            &mut |_| {},
        );

        assert!(matches!(result, Err(PrintError::PermissionDenied(_))));
    }
}
