//! A-XDR encoder for DLMS/COSEM

use crate::axdr::types::{AxdrTag, LengthEncoding};
use dlms_core::datatypes::DataObject;
use dlms_core::DlmsResult;

/// A-XDR encoder for encoding DLMS/COSEM data types
pub struct AxdrEncoder {
    buffer: Vec<u8>,
}

impl AxdrEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new encoder with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encode a DataObject, tag included
    pub fn encode_data_object(&mut self, obj: &DataObject) -> DlmsResult<()> {
        match obj {
            DataObject::Integer8(i) => {
                self.encode_tag(AxdrTag::Integer8);
                self.encode_u8(*i as u8);
            }
            DataObject::Unsigned16(u) => {
                self.encode_tag(AxdrTag::Unsigned16);
                self.encode_u16(*u);
            }
            DataObject::Unsigned32(u) => {
                self.encode_tag(AxdrTag::Unsigned32);
                self.encode_u32(*u);
            }
            DataObject::OctetString(s) => {
                self.encode_tag(AxdrTag::OctetString);
                self.encode_octet_string(s);
            }
            DataObject::Array(arr) => {
                self.encode_tag(AxdrTag::Array);
                self.encode_sequence(arr)?;
            }
            DataObject::Structure(s) => {
                self.encode_tag(AxdrTag::Structure);
                self.encode_sequence(s)?;
            }
        }
        Ok(())
    }

    /// Encode a tag
    pub fn encode_tag(&mut self, tag: AxdrTag) {
        self.buffer.push(tag.to_u8());
    }

    /// Encode a u8
    pub fn encode_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Encode a u16 (big-endian)
    pub fn encode_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Encode a u32 (big-endian)
    pub fn encode_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Encode an octet string (length prefix + content)
    pub fn encode_octet_string(&mut self, value: &[u8]) {
        self.buffer
            .extend_from_slice(&LengthEncoding::for_len(value.len()).encode());
        self.buffer.extend_from_slice(value);
    }

    /// Encode the element count and members of an array or structure
    fn encode_sequence(&mut self, items: &[DataObject]) -> DlmsResult<()> {
        self.buffer
            .extend_from_slice(&LengthEncoding::for_len(items.len()).encode());
        for obj in items {
            self.encode_data_object(obj)?;
        }
        Ok(())
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for AxdrEncoder {
    fn default() -> Self {
        Self::new()
    }
}
