//! Conversions between the canonical, raw-byte, hex and optimized UUID representations.
//!
//! ## Optimized ordering
//! A version 1 UUID is laid out as `time_low-time_mid-time_hi_and_version-clock_seq-node`.
//! `time_low` holds the fastest-changing timestamp bits, so consecutive UUIDs scatter across a
//! B-tree index. The optimized form moves the timestamp fields into most-significant-first order:
//!
//! ```text
//! canonical bytes: [0 1 2 3] [4 5] [6 7] [8 9] [10 .. 16]
//!                   time_low  mid   hi    clock  node
//! optimized bytes: [6 7] [4 5] [0 1 2 3] [8 9] [10 .. 16]
//! ```
//!
//! The permutation works on whole bytes; [`normalize_bytes`] is the
//! exact inverse of [`optimize_bytes`].

use crate::{UuidError, UuidResult};
use uuid::Uuid;

/// Length of a canonical hyphenated UUID string.
pub const CANONICAL_LEN: usize = 36;

/// Length of a hex (or optimized) UUID string without hyphens.
pub const HEX_LEN: usize = 32;

/// Length of a raw binary UUID.
pub const RAW_LEN: usize = 16;

/// Offsets of the hyphens in a canonical UUID string.
const HYPHEN_OFFSETS: [usize; 4] = [8, 13, 18, 23];

fn is_lower_hex(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'f')
}

/// Returns true if `input` matches `^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$`.
pub fn is_canonical(input: &str) -> bool {
    input.len() == CANONICAL_LEN
        && input.bytes().enumerate().all(|(i, b)| {
            if HYPHEN_OFFSETS.contains(&i) {
                b == b'-'
            } else {
                is_lower_hex(b)
            }
        })
}

/// Returns true if `input` is exactly 32 lowercase hex characters.
///
/// Hex and optimized strings share this shape; which one a string is depends on how it was
/// produced.
pub fn is_optimized(input: &str) -> bool {
    input.len() == HEX_LEN && input.bytes().all(is_lower_hex)
}

/// Decodes a canonical or 32-character hex UUID string into its 16 raw bytes.
///
/// Hyphens are ignored wherever they appear. Hex digits may be upper or lower case.
///
/// # Arguments
///
/// * `input` - Canonical hyphenated UUID or 32 hex characters.
///
/// # Returns
///
/// Returns the 16 bytes in standard UUID byte order.
///
/// # Errors
///
/// Returns [`UuidError::Format`] if the input, after removing hyphens, is not exactly 32 hex
/// characters.
pub fn to_raw_bytes(input: &str) -> UuidResult<[u8; RAW_LEN]> {
    let digits: Vec<u8> = input.bytes().filter(|&b| b != b'-').collect();
    if digits.len() != HEX_LEN {
        return Err(UuidError::Format(format!(
            "expected 32 hex digits, got {} in '{}'",
            digits.len(),
            input
        )));
    }

    // A 32-byte input can only match the simple form, so this is a pure hex decode.
    let uuid = Uuid::try_parse_ascii(&digits)
        .map_err(|e| UuidError::Format(format!("invalid hex in '{}': {}", input, e)))?;
    Ok(uuid.into_bytes())
}

/// Encodes 16 raw bytes as a 32-character lowercase hex string (no hyphens).
///
/// # Errors
///
/// Returns [`UuidError::Format`] if `bytes` is not exactly 16 bytes long.
pub fn to_hex_string(bytes: &[u8]) -> UuidResult<String> {
    let uuid = Uuid::from_slice(bytes).map_err(|_| {
        UuidError::Format(format!("expected 16 bytes, got {}", bytes.len()))
    })?;
    Ok(uuid.simple().to_string())
}

/// Reorders canonical UUID bytes into the optimized, time-high-first order.
pub fn optimize_bytes(bytes: [u8; RAW_LEN]) -> [u8; RAW_LEN] {
    let mut out = bytes;
    out[0..2].copy_from_slice(&bytes[6..8]);
    out[2..4].copy_from_slice(&bytes[4..6]);
    out[4..8].copy_from_slice(&bytes[0..4]);
    out
}

/// Restores canonical UUID byte order from optimized bytes.
pub fn normalize_bytes(bytes: [u8; RAW_LEN]) -> [u8; RAW_LEN] {
    let mut out = bytes;
    out[0..4].copy_from_slice(&bytes[4..8]);
    out[4..6].copy_from_slice(&bytes[2..4]);
    out[6..8].copy_from_slice(&bytes[0..2]);
    out
}

/// Converts a canonical hyphenated UUID string into its 32-character optimized form.
///
/// The timestamp fields are reordered with [`optimize_bytes`] before formatting, so version 1
/// UUIDs generated later compare greater.
///
/// # Arguments
///
/// * `input` - Lowercase canonical UUID, hyphens at offsets 8, 13, 18 and 23.
///
/// # Returns
///
/// Returns 32 lowercase hex characters without hyphens.
///
/// # Errors
///
/// Returns [`UuidError::Format`] if `input` is not a lowercase canonical UUID string.
pub fn to_optimized(input: &str) -> UuidResult<String> {
    if !is_canonical(input) {
        return Err(UuidError::Format(format!(
            "expected canonical hyphenated UUID, got '{}'",
            input
        )));
    }
    let raw = to_raw_bytes(input)?;
    Ok(Uuid::from_bytes(optimize_bytes(raw)).simple().to_string())
}

/// Converts a 32-character optimized string back into the canonical hyphenated form.
///
/// Exact inverse of [`to_optimized`].
///
/// # Arguments
///
/// * `input` - Optimized string as produced by [`to_optimized`].
///
/// # Returns
///
/// Returns the 36-character canonical string.
///
/// # Errors
///
/// Returns [`UuidError::Format`] if `input` is not exactly 32 lowercase hex characters.
pub fn to_normal(input: &str) -> UuidResult<String> {
    if !is_optimized(input) {
        return Err(UuidError::Format(format!(
            "expected 32 lowercase hex characters, got '{}'",
            input
        )));
    }
    let raw = to_raw_bytes(input)?;
    Ok(Uuid::from_bytes(normalize_bytes(raw)).hyphenated().to_string())
}
