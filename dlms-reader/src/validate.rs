//! Token validators shared by the command line and the config file
//!
//! Every check is pure: it returns the parsed value or a
//! [`ReaderError::Validation`] carrying the original token.

use crate::error::{ReaderError, ReaderResult};
use dlms_core::ObisCode;
use regex::Regex;
use std::sync::LazyLock;

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)-([0-9]+)$").expect("range pattern is valid")
});

/// Length rule for a hex-encoded value, counted in hex characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexLength {
    AtLeast(usize),
    Exactly(usize),
}

/// Parse an unsigned decimal token; signs and non-ASCII digits are rejected
fn decimal(token: &str) -> ReaderResult<i64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReaderError::validation(token, "not an integer"));
    }
    token
        .parse::<i64>()
        .map_err(|_| ReaderError::validation(token, "integer too large"))
}

/// Parse a decimal integer within `low..=high`
pub fn int_in_range(token: &str, low: i64, high: i64) -> ReaderResult<i64> {
    let value = decimal(token)?;
    if !(low..=high).contains(&value) {
        return Err(ReaderError::validation(
            token,
            format!("out of range [{}, {}]", low, high),
        ));
    }
    Ok(value)
}

/// Parse a decimal integer that must be one of `allowed`
pub fn int_one_of(token: &str, allowed: &[i64]) -> ReaderResult<i64> {
    let value = decimal(token)?;
    if !allowed.contains(&value) {
        let choices: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
        return Err(ReaderError::validation(
            token,
            format!("expected one of {}", choices.join(", ")),
        ));
    }
    Ok(value)
}

/// Parse a dotted OBIS code, six value groups in `0..=255`
pub fn obis(token: &str) -> ReaderResult<ObisCode> {
    ObisCode::from_string(token).map_err(|e| ReaderError::validation(token, e.to_string()))
}

/// Decode a hex string after checking its length rule
pub fn hex_bytes(token: &str, length: HexLength) -> ReaderResult<Vec<u8>> {
    if token.len() % 2 != 0 {
        return Err(ReaderError::validation(token, "odd number of hex digits"));
    }
    match length {
        HexLength::AtLeast(min) if token.len() < min => {
            return Err(ReaderError::validation(
                token,
                format!("expected at least {} hex digits", min),
            ));
        }
        HexLength::Exactly(len) if token.len() != len => {
            return Err(ReaderError::validation(
                token,
                format!("expected exactly {} hex digits", len),
            ));
        }
        _ => {}
    }
    hex::decode(token).map_err(|e| ReaderError::validation(token, e.to_string()))
}

/// Parse the exact tokens `true` / `false`
pub fn boolean(token: &str) -> ReaderResult<bool> {
    match token {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ReaderError::validation(token, "expected 'true' or 'false'")),
    }
}

/// Parse a `from-to` pair of non-negative integers with `from <= to`
pub fn range(token: &str) -> ReaderResult<(u64, u64)> {
    let captures = RANGE_PATTERN
        .captures(token)
        .ok_or_else(|| ReaderError::validation(token, "expected 'from-to'"))?;
    let bound = |i: usize| {
        captures[i]
            .parse::<u64>()
            .map_err(|_| ReaderError::validation(token, "range bound does not fit 64 bits"))
    };
    let (from, to) = (bound(1)?, bound(2)?);
    if to < from {
        return Err(ReaderError::validation(token, "range end is before range start"));
    }
    Ok((from, to))
}

/// Parse a `from-to` pair and encode it as a selective access descriptor
pub fn selective_access(token: &str) -> ReaderResult<Vec<u8>> {
    let (from, to) = range(token)?;
    dlms_asn1::encode_range(from, to).map_err(|e| ReaderError::validation(token, e.to_string()))
}
