//! Selective access descriptor for profile generic buffer reads
//!
//! A read of a profile generic buffer (class 7, attribute 2) may carry an
//! access selector followed by its access parameters. Two selectors are
//! produced here:
//!
//! - `1` range descriptor: entries captured between two clock values
//! - `2` entry descriptor: entries between two buffer indices
//!
//! Which one is used depends on the magnitude of the requested bounds. Small
//! values are entry indices, values at or after 2000-01-01T00:00:00Z are Unix
//! timestamps. Anything in between is ambiguous and rejected.

use crate::axdr::AxdrEncoder;
use dlms_core::datatypes::{CosemDateTime, DataObject};
use dlms_core::{DlmsError, DlmsResult, ObisCode};

/// Access selector of the range (by time) descriptor
pub const RANGE_DESCRIPTOR_SELECTOR: u8 = 1;

/// Access selector of the entry (by index) descriptor
pub const ENTRY_DESCRIPTOR_SELECTOR: u8 = 2;

/// Upper bound (exclusive) of values read as buffer entry indices
pub const ENTRY_INDEX_LIMIT: u64 = 65_536;

/// 2000-01-01T00:00:00Z, lower bound (inclusive) of values read as timestamps
pub const TIMESTAMP_THRESHOLD: u64 = 946_684_800;

/// Class id of the clock interface class, the restricting object of a range read
pub const CLOCK_CLASS_ID: u16 = 8;

/// Logical name of the clock object (0.0.1.0.0.255)
pub const CLOCK_LOGICAL_NAME: [u8; 6] = [0x00, 0x00, 0x01, 0x00, 0x00, 0xFF];

/// Clock attribute holding the time (attribute 2)
pub const CLOCK_TIME_ATTRIBUTE: i8 = 2;

/// Data index of the restricting object; 0 selects the whole attribute
pub const CLOCK_DATA_INDEX: u16 = 0;

/// Kind of descriptor a (from, to) pair resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// Both bounds are buffer entry indices
    Entry,
    /// Both bounds are Unix timestamps
    Time,
}

impl RangeKind {
    /// Classify a pair of bounds
    ///
    /// Returns an error when `to < from`, when a bound falls in the band
    /// between the entry limit and the timestamp threshold, or when the pair
    /// mixes an entry index with a timestamp.
    pub fn classify(from: u64, to: u64) -> DlmsResult<Self> {
        if to < from {
            return Err(DlmsError::InvalidData(format!(
                "Range end {} is before range start {}",
                to, from
            )));
        }
        if from < ENTRY_INDEX_LIMIT && to < ENTRY_INDEX_LIMIT {
            Ok(RangeKind::Entry)
        } else if from >= TIMESTAMP_THRESHOLD && to >= TIMESTAMP_THRESHOLD {
            Ok(RangeKind::Time)
        } else {
            Err(DlmsError::InvalidData(format!(
                "Range {}-{} is neither an entry range (< {}) nor a time range (>= {})",
                from, to, ENTRY_INDEX_LIMIT, TIMESTAMP_THRESHOLD
            )))
        }
    }

    /// Access selector byte of this descriptor kind
    pub fn selector(&self) -> u8 {
        match self {
            RangeKind::Entry => ENTRY_DESCRIPTOR_SELECTOR,
            RangeKind::Time => RANGE_DESCRIPTOR_SELECTOR,
        }
    }
}

/// Encode a selective access descriptor for the bounds `from..=to`
///
/// The result is the access selector byte followed by the A-XDR encoded
/// access parameters, ready to be attached to a GET request.
pub fn encode_range(from: u64, to: u64) -> DlmsResult<Vec<u8>> {
    let kind = RangeKind::classify(from, to)?;
    let parameters = match kind {
        RangeKind::Entry => entry_parameters(from, to),
        RangeKind::Time => time_parameters(from, to)?,
    };

    let mut encoder = AxdrEncoder::with_capacity(64);
    encoder.encode_u8(kind.selector());
    encoder.encode_data_object(&parameters)?;
    let descriptor = encoder.into_bytes();
    log::trace!("Range {}-{} encoded as {:?} descriptor {:02X?}", from, to, kind, descriptor);
    Ok(descriptor)
}

/// entry_descriptor ::= structure { from_entry, to_entry, from_selected_value, to_selected_value }
fn entry_parameters(from: u64, to: u64) -> DataObject {
    // Both bounds are below ENTRY_INDEX_LIMIT here.
    DataObject::new_structure(vec![
        DataObject::new_unsigned32(from as u32),
        DataObject::new_unsigned32(to as u32),
        DataObject::new_unsigned16(0),
        DataObject::new_unsigned16(0),
    ])
}

/// range_descriptor ::= structure { restricting_object, from_value, to_value, selected_values }
fn time_parameters(from: u64, to: u64) -> DlmsResult<DataObject> {
    let restricting_object = DataObject::new_structure(vec![
        DataObject::new_unsigned16(CLOCK_CLASS_ID),
        DataObject::new_octet_string(ObisCode::from(CLOCK_LOGICAL_NAME).to_bytes().to_vec()),
        DataObject::new_integer8(CLOCK_TIME_ATTRIBUTE),
        DataObject::new_unsigned16(CLOCK_DATA_INDEX),
    ]);
    let from_value = CosemDateTime::from_unix_utc(from)?;
    let to_value = CosemDateTime::from_unix_utc(to)?;

    Ok(DataObject::new_structure(vec![
        restricting_object,
        DataObject::new_date_time_octets(&from_value),
        DataObject::new_date_time_octets(&to_value),
        DataObject::new_array(Vec::new())?,
    ]))
}
