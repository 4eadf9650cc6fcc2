//! # Hex Command Codec
//!
//! Printer settings carry the init/cutter/drawer sequences as human-editable
//! hex strings (`"1D,56,42,00"`). This module converts between that form and
//! raw bytes.
//!
//! ## Accepted Input
//!
//! - Tokens separated by runs of commas and/or whitespace
//! - Optional `0x`/`0X` prefix per token
//! - Each token one byte, `00`–`FF`
//! - Blank input is a valid empty command block
//!
//! ```
//! use puente::protocol::hex;
//!
//! assert_eq!(hex::parse("1D,56,42,00").unwrap(), vec![0x1D, 0x56, 0x42, 0x00]);
//! assert_eq!(hex::parse(" 0x1b  40 ").unwrap(), vec![0x1B, 0x40]);
//! assert_eq!(hex::parse("").unwrap(), Vec::<u8>::new());
//! ```

use crate::error::PrintError;

/// Parse a hex command string into raw bytes.
///
/// Fails with [`PrintError::MalformedCommand`] when any token is not valid
/// hex or encodes a value outside `0..=255`.
pub fn parse(input: &str) -> Result<Vec<u8>, PrintError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Result<u8, PrintError> {
    let normalized = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);

    // u8 parsing enforces the 0..=255 range: "256" and "-1" both fail here.
    u8::from_str_radix(normalized, 16)
        .map_err(|_| PrintError::MalformedCommand(format!("byte out of range: {token}")))
}

/// Encode bytes as the canonical settings representation: uppercase hex,
/// comma-separated. `parse(&encode(b))` returns `b` for any byte sequence.
pub fn encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_cutter_default() {
        assert_eq!(
            parse("1D,56,42,00").unwrap(),
            vec![0x1D, 0x56, 0x42, 0x00]
        );
    }

    #[test]
    fn test_parse_blank_is_empty() {
        assert_eq!(parse("").unwrap(), Vec::<u8>::new());
        assert_eq!(parse("   ").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_parse_mixed_separators() {
        assert_eq!(
            parse("1B 70,00 ,  19\tFA").unwrap(),
            vec![0x1B, 0x70, 0x00, 0x19, 0xFA]
        );
    }

    #[test]
    fn test_parse_0x_prefix() {
        assert_eq!(parse("0x1D,0X56").unwrap(), vec![0x1D, 0x56]);
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!(matches!(
            parse("zz"),
            Err(PrintError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(matches!(
            parse("1D,256"),
            Err(PrintError::MalformedCommand(_))
        ));
        assert!(matches!(
            parse("100"), // 0x100 = 256
            Err(PrintError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_encode_round_trip() {
        let sequences: &[&[u8]] = &[
            &[],
            &[0x00],
            &[0x1D, 0x56, 0x42, 0x00],
            &[0xFF, 0x00, 0x7F, 0x80],
        ];
        for bytes in sequences {
            assert_eq!(parse(&encode(bytes)).unwrap(), bytes.to_vec());
        }
    }

    #[test]
    fn test_encode_format() {
        assert_eq!(encode(&[0x1B, 0x70, 0x00, 0x19, 0xFA]), "1B,70,00,19,FA");
        assert_eq!(encode(&[]), "");
    }
}
