//! # GS v 0 Raster Encoding
//!
//! Converts a decoded page bitmap into ESC/POS raster command blocks.
//!
//! ## Command Layout
//!
//! | Format | Bytes |
//! |--------|-------|
//! | ASCII  | GS v 0 m xL xH yL yH d1...dk |
//! | Hex    | 1D 76 30 00 xL xH yL yH d1...dk |
//!
//! - `m`: mode, fixed at 0 (normal density)
//! - `xL, xH`: bytes per row, little-endian (`ceil(width / 8)`)
//! - `yL, yH`: row count, little-endian
//! - `d1...dk`: packed rows, `k = bytes_per_row × rows`
//!
//! ## Bit Packing
//!
//! Each byte covers 8 horizontal dots, MSB = leftmost:
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```
//!
//! A partial final byte per row is left-aligned (zero-padded on the right).
//!
//! ## Thresholding
//!
//! Pixels with alpha below 128 count as paper (no ink). Opaque pixels are
//! reduced to luminance `0.299 R + 0.587 G + 0.114 B` and print as ink when
//! the luminance falls below the threshold.
//!
//! ## Chunking
//!
//! Printers with shallow receive buffers choke on a single tall raster
//! block. [`encode_chunked`] partitions the rows into independently headered
//! commands of at most `max_rows_per_chunk` rows (default 64) so the
//! transport can stream them incrementally; concatenated in order they print
//! identically to the single-block form.

use image::{Rgba, RgbaImage};

use super::commands::{GS, u16_le};
use crate::error::PrintError;

/// Default luminance threshold: mid-gray.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Default row budget per chunk for [`encode_chunked`].
pub const DEFAULT_MAX_ROWS_PER_CHUNK: usize = 64;

/// Encode a bitmap as a single raster command block.
///
/// Output length is exactly `8 + ceil(width/8) × height` bytes.
pub fn encode(bitmap: &RgbaImage, threshold: u8) -> Vec<u8> {
    let width = bitmap.width() as usize;
    let height = bitmap.height() as usize;
    let bytes_per_row = width.div_ceil(8);

    let mut out = Vec::with_capacity(8 + bytes_per_row * height);
    out.extend_from_slice(&header(bytes_per_row, height));
    pack_rows(bitmap, 0, height, threshold, &mut out);
    out
}

/// Encode a bitmap as an ordered sequence of raster command blocks, each
/// covering at most `max_rows_per_chunk` rows.
///
/// Fails with [`PrintError::InvalidArgument`] when `max_rows_per_chunk` is 0.
pub fn encode_chunked(
    bitmap: &RgbaImage,
    threshold: u8,
    max_rows_per_chunk: usize,
) -> Result<Vec<Vec<u8>>, PrintError> {
    if max_rows_per_chunk == 0 {
        return Err(PrintError::InvalidArgument(
            "max_rows_per_chunk must be > 0".to_string(),
        ));
    }

    let width = bitmap.width() as usize;
    let height = bitmap.height() as usize;
    let bytes_per_row = width.div_ceil(8);

    let mut chunks = Vec::with_capacity(height.div_ceil(max_rows_per_chunk));
    let mut y = 0;
    while y < height {
        let rows = max_rows_per_chunk.min(height - y);
        let mut chunk = Vec::with_capacity(8 + bytes_per_row * rows);
        chunk.extend_from_slice(&header(bytes_per_row, rows));
        pack_rows(bitmap, y, rows, threshold, &mut chunk);
        chunks.push(chunk);
        y += rows;
    }

    Ok(chunks)
}

/// The 8-byte GS v 0 header for a block of `rows` rows.
fn header(bytes_per_row: usize, rows: usize) -> [u8; 8] {
    let [xl, xh] = u16_le(bytes_per_row as u16);
    let [yl, yh] = u16_le(rows as u16);
    [GS, b'v', b'0', 0x00, xl, xh, yl, yh]
}

/// Pack `rows` rows starting at `y0` into `out`, MSB-first.
fn pack_rows(bitmap: &RgbaImage, y0: usize, rows: usize, threshold: u8, out: &mut Vec<u8>) {
    let width = bitmap.width() as usize;

    for y in y0..y0 + rows {
        let mut byte = 0u8;
        let mut bit_count = 0u8;

        for x in 0..width {
            byte <<= 1;
            if is_ink(bitmap.get_pixel(x as u32, y as u32), threshold) {
                byte |= 0x01;
            }
            bit_count += 1;

            if bit_count == 8 {
                out.push(byte);
                byte = 0;
                bit_count = 0;
            }
        }

        if bit_count > 0 {
            out.push(byte << (8 - bit_count));
        }
    }
}

/// Black/white decision for one pixel.
fn is_ink(pixel: &Rgba<u8>, threshold: u8) -> bool {
    let [r, g, b, a] = pixel.0;
    if a < 128 {
        return false;
    }
    let luminance = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    luminance < f32::from(threshold)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(pixel))
    }

    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn test_header_black_16x3() {
        let cmd = encode(&solid(16, 3, BLACK), DEFAULT_THRESHOLD);
        assert_eq!(&cmd[0..4], &[0x1D, 0x76, 0x30, 0x00]);
        assert_eq!(cmd[4], 2); // xL: 16 dots = 2 bytes
        assert_eq!(cmd[5], 0); // xH
        assert_eq!(cmd[6], 3); // yL
        assert_eq!(cmd[7], 0); // yH
        assert_eq!(&cmd[8..], &[0xFF; 6]);
    }

    #[test]
    fn test_large_height_little_endian() {
        let cmd = encode(&solid(8, 300, WHITE), DEFAULT_THRESHOLD);
        // 300 = 0x012C
        assert_eq!(cmd[6], 0x2C);
        assert_eq!(cmd[7], 0x01);
        assert_eq!(cmd.len(), 8 + 300);
    }

    #[test]
    fn test_partial_byte_right_padded() {
        // 10 black dots: 0xFF then 11000000 left-aligned in the second byte.
        let cmd = encode(&solid(10, 1, BLACK), DEFAULT_THRESHOLD);
        assert_eq!(cmd[4], 2); // ceil(10/8)
        assert_eq!(&cmd[8..], &[0xFF, 0xC0]);
    }

    #[test]
    fn test_white_rows_are_zero() {
        let cmd = encode(&solid(384, 2, WHITE), DEFAULT_THRESHOLD);
        assert_eq!(cmd.len(), 8 + 48 * 2);
        assert!(cmd[8..].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn test_transparent_pixels_are_paper() {
        // Fully transparent black must not print.
        let cmd = encode(&solid(8, 1, [0, 0, 0, 0]), DEFAULT_THRESHOLD);
        assert_eq!(&cmd[8..], &[0x00]);
    }

    #[test]
    fn test_threshold_boundary() {
        // Luminance of a solid gray (v,v,v) is v itself.
        let gray127 = solid(8, 1, [127, 127, 127, 255]);
        let gray128 = solid(8, 1, [128, 128, 128, 255]);
        assert_eq!(encode(&gray127, 128)[8], 0xFF); // 127 < 128: ink
        assert_eq!(encode(&gray128, 128)[8], 0x00); // 128 is not < 128: paper
    }

    #[test]
    fn test_msb_first_packing() {
        // Single black pixel at x=0 of an 8-wide row sets the MSB.
        let mut img = solid(8, 1, WHITE);
        img.put_pixel(0, 0, Rgba(BLACK));
        assert_eq!(encode(&img, DEFAULT_THRESHOLD)[8], 0x80);

        let mut img = solid(8, 1, WHITE);
        img.put_pixel(7, 0, Rgba(BLACK));
        assert_eq!(encode(&img, DEFAULT_THRESHOLD)[8], 0x01);
    }

    #[test]
    fn test_chunked_rejects_zero_rows() {
        let img = solid(8, 8, BLACK);
        assert!(matches!(
            encode_chunked(&img, DEFAULT_THRESHOLD, 0),
            Err(PrintError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_chunked_row_counts_sum_to_height() {
        let img = solid(24, 150, BLACK);
        let chunks = encode_chunked(&img, DEFAULT_THRESHOLD, 64).unwrap();
        assert_eq!(chunks.len(), 3); // 64 + 64 + 22
        let total: usize = chunks
            .iter()
            .map(|c| usize::from(c[6]) | usize::from(c[7]) << 8)
            .sum();
        assert_eq!(total, 150);
        assert_eq!(chunks[2][6], 22);
    }

    #[test]
    fn test_chunked_headers_stripped_match_single_block() {
        let mut img = solid(20, 100, WHITE);
        for y in 0..100u32 {
            for x in 0..20u32 {
                if (x + y) % 3 == 0 {
                    img.put_pixel(x, y, Rgba(BLACK));
                }
            }
        }

        let single = encode(&img, DEFAULT_THRESHOLD);
        let chunks = encode_chunked(&img, DEFAULT_THRESHOLD, 16).unwrap();

        let mut reassembled = Vec::new();
        for chunk in &chunks {
            assert_eq!(&chunk[0..4], &[0x1D, 0x76, 0x30, 0x00]);
            reassembled.extend_from_slice(&chunk[8..]);
        }
        assert_eq!(reassembled, &single[8..]);
    }

    #[test]
    fn test_single_chunk_when_budget_exceeds_height() {
        let img = solid(8, 10, BLACK);
        let chunks = encode_chunked(&img, DEFAULT_THRESHOLD, 64).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], encode(&img, DEFAULT_THRESHOLD));
    }
}
