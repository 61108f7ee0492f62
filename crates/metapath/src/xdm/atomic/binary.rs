use super::{AtomicItem, cannot_cast};
use crate::engine::runtime::Error;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

pub(crate) fn parse_base64(s: &str) -> Result<Vec<u8>, Error> {
    let compact: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact.as_bytes()).map_err(|_| Error::invalid_lexical("base64", s.trim()))
}

pub(crate) fn format_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub(crate) fn parse_hex(s: &str) -> Result<Vec<u8>, Error> {
    let s = s.trim();
    let invalid = || Error::invalid_lexical("hex-binary", s);
    if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| invalid())).collect()
}

/// Upper-case hex digits, two per byte.
pub(crate) fn format_hex(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(char::from(DIGITS[usize::from(b >> 4)]));
        out.push(char::from(DIGITS[usize::from(b & 0x0f)]));
    }
    out
}

pub(crate) fn cast_to_base64(item: &AtomicItem) -> Result<Vec<u8>, Error> {
    match item {
        AtomicItem::Base64Binary(b) | AtomicItem::HexBinary(b) => Ok(b.clone()),
        other if other.is_string_like() => parse_base64(&other.as_string()),
        other => Err(cannot_cast(other, "base64")),
    }
}

pub(crate) fn cast_to_hex(item: &AtomicItem) -> Result<Vec<u8>, Error> {
    match item {
        AtomicItem::Base64Binary(b) | AtomicItem::HexBinary(b) => Ok(b.clone()),
        other if other.is_string_like() => parse_hex(&other.as_string()),
        other => Err(cannot_cast(other, "hex-binary")),
    }
}
