//! Endian-aware scalar and string primitives shared by
//! [`crate::cfb::writer`] and [`crate::cfb::parser`].
//!
//! Everything here is little-endian on the wire. MS-CFB never asks for
//! anything else, so the convention is baked in at compile time rather
//! than probed at runtime.

use std::convert::TryInto;
use chrono::NaiveDateTime;

pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

pub(crate) fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

pub(crate) fn write_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn write_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Decodes a hex string into bytes, high-nibble-first, right-padded with
/// `0x00` to `target_bytes`, truncated if the decoded value is longer.
pub(crate) fn hex_to_bytes(hex: &str, target_bytes: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(target_bytes);
    let mut chars = hex.chars();
    loop {
        let hi = match chars.next() {
            Some(c) => c,
            None => break,
        };
        let lo = chars.next().unwrap_or('0');
        let byte = (hi.to_digit(16).unwrap_or(0) as u8) << 4 | (lo.to_digit(16).unwrap_or(0) as u8);
        bytes.push(byte);
    }
    bytes.resize(target_bytes, 0);
    bytes.truncate(target_bytes);
    bytes
}

/// Encodes `text` as UTF-16LE, right-padded with `U+0000` to `target_bytes / 2`
/// code units, truncated if longer, then serialized little-endian.
pub(crate) fn utf16le_padded(text: &str, target_bytes: usize) -> Vec<u8> {
    let target_units = target_bytes / 2;
    let mut units: Vec<u16> = text.encode_utf16().collect();
    units.resize(target_units, 0);
    units.truncate(target_units);
    let mut out = Vec::with_capacity(target_bytes);
    for unit in units {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Decodes a little-endian UTF-16 byte slice into a `String`, stopping at the
/// first `U+0000` terminator (if any).
pub(crate) fn utf16le_to_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Decodes an 8-byte FILETIME (two little-endian `u32`s: low, high) into UTC
/// seconds since the Unix epoch. `(0, 0)` means "no timestamp".
pub(crate) fn decode_filetime(bytes: &[u8]) -> Option<NaiveDateTime> {
    let low = read_u32(bytes, 0) as u64;
    let high = read_u32(bytes, 4) as u64;
    if low == 0 && high == 0 {
        return None;
    }
    let ticks = (high << 32) | low;
    let seconds = ticks / 10_000_000;
    let nanos = (ticks % 10_000_000) * 100;
    let unix_seconds = seconds as i64 - 11_644_473_600;
    NaiveDateTime::from_timestamp_opt(unix_seconds, nanos as u32)
}

/// The writer never round-trips timestamps — MS-CFB readers tolerate a
/// compound file whose creation/modification times are all zero, and this
/// crate always emits zero.
pub(crate) fn zero_filetime(out: &mut Vec<u8>) {
    out.extend_from_slice(&[0u8; 8]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_decode_matches_oracle() {
        assert_eq!(hex_to_bytes("4080c1ff0120", 4), vec![0x40, 0x80, 0xc1, 0xff]);
    }

    #[test]
    fn utf16le_pad_matches_oracle() {
        assert_eq!(utf16le_padded("abc", 8), vec![97, 0, 98, 0, 99, 0, 0, 0]);
    }

    #[test]
    fn scalar_encode_matches_oracle() {
        let mut out = Vec::new();
        write_u16(&mut out, 0x1234);
        assert_eq!(out, vec![0x34, 0x12]);

        let mut out = Vec::new();
        write_i32(&mut out, -31);
        assert_eq!(out, vec![0xe1, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn scalar_decode_matches_oracle() {
        assert_eq!(read_i32(&[0xE4, 0xFF, 0xFF, 0xFF], 0), -31);
        assert_eq!(read_u16(&[0xE4, 0xFF], 0), 0xFFE4);
    }

    #[test]
    fn filetime_zero_is_null() {
        assert_eq!(decode_filetime(&[0u8; 8]), None);
    }

    #[test]
    fn utf16le_roundtrip_strips_terminator() {
        let bytes = utf16le_padded("hello", 12);
        assert_eq!(utf16le_to_string(&bytes), "hello");
    }
}
