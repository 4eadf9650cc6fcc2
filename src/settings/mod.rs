//! # Printer Settings and Profiles
//!
//! Value objects describing how a page is rasterized and where it is sent:
//!
//! - [`PrintSettings`]: one printer's resolved configuration, including the
//!   derived dot geometry
//! - [`PrinterProfile`]: a persisted printer entry (several may share an
//!   address, disambiguated by [`PrinterProfileType`])
//! - [`store::SettingsStore`]: JSON-file persistence for defaults + profiles
//!
//! ## Dot Geometry
//!
//! ```text
//! dots_per_mm = 8  (203 DPI)   | 12 (300 DPI) | round(dpi / 25.4) otherwise
//! width_dots  = print_width_mm × dots_per_mm   (never below 1)
//!
//! 48mm at 203 DPI → 384 dots → 48 bytes per raster row
//! ```

pub mod store;

use serde::{Deserialize, Serialize};

use crate::protocol::commands::{
    DEFAULT_CUTTER_COMMANDS, DEFAULT_DRAWER_COMMANDS, DEFAULT_INITIAL_COMMANDS,
};

/// How a document is put on paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintMode {
    /// Rasterize the rendered page (the only mode the pipeline implements
    /// end-to-end; kept on the profile for host compatibility).
    Graphic,
    /// Raw text passthrough.
    Text,
}

impl Default for PrintMode {
    fn default() -> Self {
        Self::Graphic
    }
}

/// Physical transport a profile is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterType {
    Bluetooth,
    Ethernet,
}

/// Disambiguates multiple profiles sharing one printer address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterProfileType {
    Order,
    Receipt,
}

impl Default for PrinterProfileType {
    fn default() -> Self {
        Self::Order
    }
}

impl PrinterProfileType {
    /// Lenient parse for inbound type hints: anything that isn't "receipt"
    /// is an order profile.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "receipt" => Self::Receipt,
            _ => Self::Order,
        }
    }
}

/// Resolved configuration for one print job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintSettings {
    pub printer_name: Option<String>,
    /// Required before dispatch; jobs without it fail fast.
    pub printer_address: Option<String>,
    pub print_mode: PrintMode,
    pub print_width_mm: u32,
    pub print_resolution_dpi: u32,
    /// Hex command strings, human-editable (see [`crate::protocol::hex`]).
    pub initial_commands: String,
    pub cutter_commands: String,
    pub drawer_commands: String,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            printer_name: None,
            printer_address: None,
            print_mode: PrintMode::default(),
            print_width_mm: 48,
            print_resolution_dpi: 203,
            initial_commands: DEFAULT_INITIAL_COMMANDS.to_string(),
            cutter_commands: DEFAULT_CUTTER_COMMANDS.to_string(),
            drawer_commands: DEFAULT_DRAWER_COMMANDS.to_string(),
        }
    }
}

impl PrintSettings {
    /// Print density derived from the configured DPI.
    ///
    /// The two receipt-printer resolutions get their conventional values;
    /// anything else falls back to the metric conversion, floored at 1.
    pub fn dots_per_mm(&self) -> u32 {
        match self.print_resolution_dpi {
            203 => 8,
            300 => 12,
            dpi => ((dpi as f32 / 25.4).round() as u32).max(1),
        }
    }

    /// Total printable width in dots. Always ≥ 1.
    pub fn width_dots(&self) -> u32 {
        (self.print_width_mm * self.dots_per_mm()).max(1)
    }
}

/// A persisted printer entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterProfile {
    /// Stable identity (uuid v4 when created by the bridge).
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub printer_type: PrinterType,
    #[serde(default)]
    pub print_mode: PrintMode,
    pub print_width_mm: u32,
    pub print_resolution_dpi: u32,
    #[serde(default)]
    pub initial_commands: String,
    #[serde(default)]
    pub cutter_commands: String,
    #[serde(default)]
    pub drawer_commands: String,
    /// Optional PDF URL used by the graphic test page.
    #[serde(default)]
    pub graphic_test_url: String,
    #[serde(default)]
    pub profile_type: PrinterProfileType,
}

impl PrinterProfile {
    /// Project this profile into the settings a job consumes.
    pub fn settings(&self) -> PrintSettings {
        PrintSettings {
            printer_name: Some(self.name.clone()),
            printer_address: Some(self.address.clone()),
            print_mode: self.print_mode,
            print_width_mm: self.print_width_mm,
            print_resolution_dpi: self.print_resolution_dpi,
            initial_commands: self.initial_commands.clone(),
            cutter_commands: self.cutter_commands.clone(),
            drawer_commands: self.drawer_commands.clone(),
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
    fn test_width_dots_48mm_203dpi() {
        let settings = PrintSettings::default();
        assert_eq!(settings.print_width_mm, 48);
        assert_eq!(settings.dots_per_mm(), 8);
        assert_eq!(settings.width_dots(), 384);
    }

    #[test]
    fn test_dots_per_mm_300dpi() {
        let settings = PrintSettings {
            print_resolution_dpi: 300,
            ..Default::default()
        };
        assert_eq!(settings.dots_per_mm(), 12);
    }

    #[test]
    fn test_dots_per_mm_unrecognized_dpi() {
        let settings = PrintSettings {
            print_resolution_dpi: 150,
            ..Default::default()
        };
        // round(150 / 25.4) = 6
        assert_eq!(settings.dots_per_mm(), 6);
    }

    #[test]
    fn test_width_dots_never_below_one() {
        let settings = PrintSettings {
            print_width_mm: 0,
            ..Default::default()
        };
        assert_eq!(settings.width_dots(), 1);
    }

    #[test]
    fn test_profile_type_parse_is_lenient() {
        assert_eq!(
            PrinterProfileType::parse_or_default("RECEIPT"),
            PrinterProfileType::Receipt
        );
        assert_eq!(
            PrinterProfileType::parse_or_default(" receipt "),
            PrinterProfileType::Receipt
        );
        assert_eq!(
            PrinterProfileType::parse_or_default("order"),
            PrinterProfileType::Order
        );
        assert_eq!(
            PrinterProfileType::parse_or_default("anything"),
            PrinterProfileType::Order
        );
        assert_eq!(
            PrinterProfileType::parse_or_default(""),
            PrinterProfileType::Order
        );
    }

    #[test]
    fn test_default_command_strings() {
        let settings = PrintSettings::default();
        assert_eq!(settings.initial_commands, "");
        assert_eq!(settings.cutter_commands, "1D,56,42,00");
        assert_eq!(settings.drawer_commands, "1B,70,00,19,FA");
    }

    #[test]
    fn test_profile_projects_into_settings() {
        let profile = PrinterProfile {
            id: "p1".to_string(),
            name: "Kitchen".to_string(),
            address: "192.168.1.50".to_string(),
            printer_type: PrinterType::Ethernet,
            print_mode: PrintMode::Graphic,
            print_width_mm: 64,
            print_resolution_dpi: 203,
            initial_commands: String::new(),
            cutter_commands: "1D,56,42,00".to_string(),
            drawer_commands: String::new(),
            graphic_test_url: String::new(),
            profile_type: PrinterProfileType::Order,
        };
        let settings = profile.settings();
        assert_eq!(settings.printer_address.as_deref(), Some("192.168.1.50"));
        assert_eq!(settings.width_dots(), 512);
    }
}
