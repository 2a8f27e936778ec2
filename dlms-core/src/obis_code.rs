use crate::error::{DlmsError, DlmsResult};
use std::fmt;
use std::str::FromStr;

/// Number of value groups in an OBIS code
pub const OBIS_LENGTH: usize = 6;

/// OBIS (Object Identification System) code for identifying COSEM objects
///
/// OBIS codes are 6-byte identifiers used in DLMS/COSEM to uniquely identify
/// objects in a logical device. In LN referencing the code is sent as the
/// object's logical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObisCode {
    bytes: [u8; OBIS_LENGTH],
}

impl ObisCode {
    /// Create a new OBIS code from individual value groups
    pub fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self {
            bytes: [a, b, c, d, e, f],
        }
    }

    /// Parse an OBIS code from its dotted form, e.g. "1.0.99.1.0.255"
    ///
    /// Exactly six components are required and every component must be a
    /// decimal integer in `0..=255`.
    pub fn from_string(s: &str) -> DlmsResult<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != OBIS_LENGTH {
            return Err(DlmsError::InvalidData(format!(
                "Expected {} dot-separated values in OBIS code '{}', got {}",
                OBIS_LENGTH,
                s,
                parts.len()
            )));
        }

        let mut bytes = [0u8; OBIS_LENGTH];
        for (i, part) in parts.iter().enumerate() {
            // u8::from_str alone would accept a leading '+'
            let digits_only = !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
            let value = if digits_only { part.parse::<u8>().ok() } else { None };
            bytes[i] = value.ok_or_else(|| {
                DlmsError::InvalidData(format!(
                    "Invalid value group '{}' in OBIS code '{}'",
                    part, s
                ))
            })?;
        }

        Ok(Self { bytes })
    }

    /// Get the OBIS code as a byte array
    pub fn as_bytes(&self) -> &[u8; OBIS_LENGTH] {
        &self.bytes
    }

    /// Get the OBIS code as a copied byte array
    pub fn to_bytes(&self) -> [u8; OBIS_LENGTH] {
        self.bytes
    }

    /// Get the A value (first byte)
    pub fn a(&self) -> u8 {
        self.bytes[0]
    }

    /// Get the F value (sixth byte)
    pub fn f(&self) -> u8 {
        self.bytes[5]
    }
}

impl From<[u8; OBIS_LENGTH]> for ObisCode {
    fn from(bytes: [u8; OBIS_LENGTH]) -> Self {
        Self { bytes }
    }
}

impl FromStr for ObisCode {
    type Err = DlmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for ObisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}.{}",
            self.bytes[0], self.bytes[1], self.bytes[2],
            self.bytes[3], self.bytes[4], self.bytes[5]
        )
    }
}
