//! # ESC/POS Commands
//!
//! Command constants and builders for the ESC/POS protocol spoken by
//! Epson-compatible receipt and label printers.
//!
//! ## Escape Sequence Structure
//!
//! Commands are byte sequences introduced by a prefix byte:
//! - `ESC` (0x1B) for classic commands (`ESC @`, `ESC p` ...)
//! - `GS` (0x1D) for extended commands (`GS V`, `GS v 0` ...)
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`.
//!
//! ## Configurable Sequences
//!
//! The init/cutter/drawer sequences a job transmits come from settings as
//! hex strings (see [`super::hex`]) so operators can adjust them per printer.
//! The builders here produce the canonical defaults those strings encode.

/// ESC (Escape) - command prefix byte.
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - extended command prefix.
pub const GS: u8 = 0x1D;

/// Default cutter sequence: `GS V B 0`, full cut after feeding to the cut
/// position.
pub const DEFAULT_CUTTER_COMMANDS: &str = "1D,56,42,00";

/// Default drawer-kick sequence: `ESC p 0 25 250`, pulse connector pin 2
/// with 50ms on / 500ms off timing.
pub const DEFAULT_DRAWER_COMMANDS: &str = "1B,70,00,19,FA";

/// Default initialization sequence: empty. Printers that need a reset before
/// raster data can be configured with `1B,40` (`ESC @`).
pub const DEFAULT_INITIAL_COMMANDS: &str = "";

/// # Initialize Printer (ESC @)
///
/// Resets the printer to its power-on default state: clears the print
/// buffer, text formatting, and line spacing. Stored logos and configuration
/// settings are unaffected.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Full Cut With Feed (GS V B 0)
///
/// Feeds paper to the cutter position, then performs a full cut. The most
/// common end-of-receipt command; matches [`DEFAULT_CUTTER_COMMANDS`].
///
/// | Format  | Bytes       |
/// |---------|-------------|
/// | ASCII   | GS V B 0    |
/// | Hex     | 1D 56 42 00 |
#[inline]
pub fn cut_full_feed() -> Vec<u8> {
    vec![GS, b'V', b'B', 0]
}

/// # Kick Cash Drawer (ESC p m t1 t2)
///
/// Pulses drawer connector pin `m` for `t1 × 2`ms on, `t2 × 2`ms off.
/// The default targets pin 2 (m=0) with 50ms/500ms timing; matches
/// [`DEFAULT_DRAWER_COMMANDS`].
///
/// | Format  | Bytes          |
/// |---------|----------------|
/// | ASCII   | ESC p 0 25 250 |
/// | Hex     | 1B 70 00 19 FA |
#[inline]
pub fn kick_drawer() -> Vec<u8> {
    vec![ESC, b'p', 0x00, 0x19, 0xFA]
}

/// Encode a u16 value as little-endian bytes `[low, high]`.
///
/// ## Example
///
/// ```
/// use puente::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(384), [0x80, 0x01]); // 48mm at 203 DPI
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================
