//! # ESC/POS Protocol Layer
//!
//! Byte-level building blocks for talking to receipt printers:
//!
//! - [`commands`]: command constants and canonical init/cutter/drawer bytes
//! - [`hex`]: codec for the human-editable hex command strings in settings
//! - [`raster`]: bitmap → GS v 0 raster command encoding
//!
//! Everything in this layer is pure — no I/O, deterministic given inputs.
//! The transport layer ships the produced byte chunks unmodified.

pub mod commands;
pub mod hex;
pub mod raster;
