//! # Settings Store
//!
//! JSON-file persistence for the default print settings, saved printer
//! profiles, the selected profile, and the last Ethernet address a job used.
//!
//! The store is a plain read-modify-write snapshot: callers take settings
//! once at job start and never observe mid-job mutation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{PrintSettings, PrinterProfile, PrinterProfileType};
use crate::error::PrintError;

/// Default store location, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "puente_settings.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredSettings {
    defaults: PrintSettings,
    printers: Vec<PrinterProfile>,
    selected_printer_id: Option<String>,
    last_ethernet_ip: Option<String>,
}

/// On-disk settings store.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    data: StoredSettings,
}

impl SettingsStore {
    /// Load the store from `path`. A missing file yields built-in defaults;
    /// an unreadable or unparsable file is a configuration error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PrintError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw).map_err(|e| {
                PrintError::Configuration(format!("Settings file is not valid: {e}"))
            })?
        } else {
            StoredSettings::default()
        };
        Ok(Self { path, data })
    }

    /// An in-memory store that never touches disk until [`save`](Self::save).
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
            data: StoredSettings::default(),
        }
    }

    /// Persist the current state.
    pub fn save(&self) -> Result<(), PrintError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.data)
            .map_err(|e| PrintError::Configuration(format!("Settings not serializable: {e}")))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// The settings snapshot a job resolves against when no profile applies.
    pub fn settings(&self) -> PrintSettings {
        self.data.defaults.clone()
    }

    /// Replace the stored defaults.
    pub fn set_defaults(&mut self, defaults: PrintSettings) {
        self.data.defaults = defaults;
    }

    pub fn printers(&self) -> &[PrinterProfile] {
        &self.data.printers
    }

    pub fn selected_printer_id(&self) -> Option<&str> {
        self.data.selected_printer_id.as_deref()
    }

    /// Insert or update a profile by id. When `select` is set, the profile
    /// also becomes the selected printer and its name/address are copied
    /// into the defaults, so id- and CLI-path jobs target it.
    pub fn upsert_printer(&mut self, profile: PrinterProfile, select: bool) {
        match self.data.printers.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => self.data.printers.push(profile.clone()),
        }
        if select {
            self.apply_selection(&profile);
        }
    }

    /// Select a stored profile by id. Returns false when no profile matches.
    pub fn select_printer(&mut self, id: &str) -> bool {
        let Some(profile) = self.data.printers.iter().find(|p| p.id == id).cloned() else {
            return false;
        };
        self.apply_selection(&profile);
        true
    }

    fn apply_selection(&mut self, profile: &PrinterProfile) {
        self.data.selected_printer_id = Some(profile.id.clone());
        self.data.defaults.printer_name = Some(profile.name.clone());
        self.data.defaults.printer_address = Some(profile.address.clone());
    }

    /// Delete a profile. Clears the selection and the cached last Ethernet
    /// address when they refer to the deleted profile. Returns false when no
    /// profile matches.
    pub fn delete_printer(&mut self, id: &str) -> bool {
        let Some(index) = self.data.printers.iter().position(|p| p.id == id) else {
            return false;
        };
        let removed = self.data.printers.remove(index);

        if self.data.selected_printer_id.as_deref() == Some(id) {
            self.data.selected_printer_id = None;
        }
        if self
            .data
            .last_ethernet_ip
            .as_deref()
            .is_some_and(|ip| ip.eq_ignore_ascii_case(&removed.address))
        {
            self.data.last_ethernet_ip = None;
        }
        true
    }

    pub fn find_printer(&self, id: &str) -> Option<&PrinterProfile> {
        self.data.printers.iter().find(|p| p.id == id)
    }

    /// Resolve the profile a URL-path job should print with: exact match on
    /// (address, profile type), falling back to an ORDER profile at the same
    /// address, else nothing (caller uses the defaults).
    pub fn resolve_for_address(
        &self,
        address: &str,
        profile_type: PrinterProfileType,
    ) -> Option<&PrinterProfile> {
        let by_type = self
            .data
            .printers
            .iter()
            .find(|p| p.address.eq_ignore_ascii_case(address) && p.profile_type == profile_type);
        by_type.or_else(|| {
            self.data.printers.iter().find(|p| {
                p.address.eq_ignore_ascii_case(address)
                    && p.profile_type == PrinterProfileType::Order
            })
        })
    }

    pub fn last_ethernet_ip(&self) -> Option<&str> {
        self.data.last_ethernet_ip.as_deref()
    }

    pub fn remember_ethernet_ip(&mut self, address: &str) {
        self.data.last_ethernet_ip = Some(address.to_string());
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{PrintMode, PrinterType};

    fn profile(id: &str, address: &str, profile_type: PrinterProfileType) -> PrinterProfile {
        PrinterProfile {
            id: id.to_string(),
            name: format!("Printer {id}"),
            address: address.to_string(),
            printer_type: PrinterType::Ethernet,
            print_mode: PrintMode::Graphic,
            print_width_mm: 48,
            print_resolution_dpi: 203,
            initial_commands: String::new(),
            cutter_commands: "1D,56,42,00".to_string(),
            drawer_commands: String::new(),
            graphic_test_url: String::new(),
            profile_type,
        }
    }

    #[test]
    fn test_upsert_select_updates_defaults() {
        let mut store = SettingsStore::in_memory();
        store.upsert_printer(profile("a", "192.168.1.50", PrinterProfileType::Order), true);

        assert_eq!(store.selected_printer_id(), Some("a"));
        let settings = store.settings();
        assert_eq!(settings.printer_address.as_deref(), Some("192.168.1.50"));
        assert_eq!(settings.printer_name.as_deref(), Some("Printer a"));
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut store = SettingsStore::in_memory();
        store.upsert_printer(profile("a", "192.168.1.50", PrinterProfileType::Order), false);
        store.upsert_printer(profile("a", "192.168.1.60", PrinterProfileType::Order), false);

        assert_eq!(store.printers().len(), 1);
        assert_eq!(store.printers()[0].address, "192.168.1.60");
    }

    #[test]
    fn test_delete_cascades_ethernet_cache() {
        let mut store = SettingsStore::in_memory();
        store.upsert_printer(profile("a", "192.168.1.50", PrinterProfileType::Order), true);
        store.remember_ethernet_ip("192.168.1.50");

        assert!(store.delete_printer("a"));
        assert_eq!(store.last_ethernet_ip(), None);
        assert_eq!(store.selected_printer_id(), None);
        assert!(store.printers().is_empty());
    }

    #[test]
    fn test_delete_keeps_unrelated_ethernet_cache() {
        let mut store = SettingsStore::in_memory();
        store.upsert_printer(profile("a", "192.168.1.50", PrinterProfileType::Order), false);
        store.remember_ethernet_ip("192.168.1.99");

        assert!(store.delete_printer("a"));
        assert_eq!(store.last_ethernet_ip(), Some("192.168.1.99"));
    }

    #[test]
    fn test_resolve_prefers_profile_type_then_order() {
        let mut store = SettingsStore::in_memory();
        store.upsert_printer(profile("o", "192.168.1.50", PrinterProfileType::Order), false);
        store.upsert_printer(profile("r", "192.168.1.50", PrinterProfileType::Receipt), false);

        let hit = store
            .resolve_for_address("192.168.1.50", PrinterProfileType::Receipt)
            .unwrap();
        assert_eq!(hit.id, "r");

        // No RECEIPT profile at this address: fall back to the ORDER one.
        assert!(store.delete_printer("r"));
        let hit = store
            .resolve_for_address("192.168.1.50", PrinterProfileType::Receipt)
            .unwrap();
        assert_eq!(hit.id, "o");

        // Address matching is case-insensitive (Bluetooth MACs).
        store.upsert_printer(profile("bt", "AA:BB:CC:DD:EE:FF", PrinterProfileType::Order), false);
        assert!(
            store
                .resolve_for_address("aa:bb:cc:dd:ee:ff", PrinterProfileType::Order)
                .is_some()
        );
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = std::env::temp_dir().join("puente_store_test");
        let path = dir.join("settings.json");
        let _ = fs::remove_file(&path);

        let mut store = SettingsStore::load(&path).unwrap();
        store.upsert_printer(profile("a", "192.168.1.50", PrinterProfileType::Order), true);
        store.save().unwrap();

        let reloaded = SettingsStore::load(&path).unwrap();
        assert_eq!(reloaded.printers().len(), 1);
        assert_eq!(reloaded.selected_printer_id(), Some("a"));

        let _ = fs::remove_file(&path);
    }
}
