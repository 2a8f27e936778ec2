//! Data object types for DLMS/COSEM protocol

use crate::error::{DlmsError, DlmsResult};
use crate::datatypes::cosem_date_time::CosemDateTime;

/// Container for data sent to the smart meter
///
/// Covers the types a read request needs to carry in its access parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataObject {
    /// Integer 8-bit
    Integer8(i8),
    /// Unsigned integer 16-bit
    Unsigned16(u16),
    /// Unsigned integer 32-bit
    Unsigned32(u32),
    /// Octet string
    OctetString(Vec<u8>),
    /// Array of DataObjects
    Array(Vec<DataObject>),
    /// Structure (ordered list of DataObjects)
    Structure(Vec<DataObject>),
}

impl DataObject {
    /// Constructs an integer 8-bit data
    pub fn new_integer8(int8: i8) -> Self {
        DataObject::Integer8(int8)
    }

    /// Constructs an unsigned 16-bit data
    pub fn new_unsigned16(u_int16: u16) -> Self {
        DataObject::Unsigned16(u_int16)
    }

    /// Constructs an unsigned 32-bit data
    pub fn new_unsigned32(u_int32: u32) -> Self {
        DataObject::Unsigned32(u_int32)
    }

    /// Constructs an octet string data
    pub fn new_octet_string(string: Vec<u8>) -> Self {
        DataObject::OctetString(string)
    }

    /// Constructs a COSEM date-time carried as a 12-byte octet string
    pub fn new_date_time_octets(date_time: &CosemDateTime) -> Self {
        DataObject::OctetString(date_time.encode().to_vec())
    }

    /// Constructs an array; all elements must share one type
    pub fn new_array(array: Vec<DataObject>) -> DlmsResult<Self> {
        if let Some(first) = array.first() {
            let kind = std::mem::discriminant(first);
            if array.iter().any(|item| std::mem::discriminant(item) != kind) {
                return Err(DlmsError::InvalidData(
                    "Array elements must have the same type".to_string(),
                ));
            }
        }
        Ok(DataObject::Array(array))
    }

    /// Constructs a structure
    pub fn new_structure(structure: Vec<DataObject>) -> Self {
        DataObject::Structure(structure)
    }
}
