//! A-XDR types for DLMS/COSEM

/// A-XDR tag values for the data types a read request carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxdrTag {
    Array = 0x01,
    Structure = 0x02,
    Unsigned32 = 0x06,
    OctetString = 0x09,
    Integer8 = 0x0F,
    Unsigned16 = 0x12,
}

impl AxdrTag {
    /// Convert tag to u8 value
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Length encoding for variable-length types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthEncoding {
    /// Short form: length < 128, encoded in 1 byte
    Short(u8),
    /// Long form: length >= 128, encoded with length-of-length byte + length bytes
    Long(usize),
}

impl LengthEncoding {
    /// Pick the shortest form able to carry `len`
    pub fn for_len(len: usize) -> Self {
        if len < 0x80 {
            LengthEncoding::Short(len as u8)
        } else {
            LengthEncoding::Long(len)
        }
    }

    /// Encode length to bytes
    pub fn encode(&self) -> Vec<u8> {
        match self {
            LengthEncoding::Short(len) => vec![*len],
            LengthEncoding::Long(len) => {
                let bytes: Vec<u8> = len
                    .to_be_bytes()
                    .into_iter()
                    .skip_while(|b| *b == 0)
                    .collect();
                let mut result = Vec::with_capacity(bytes.len() + 1);
                result.push(0x80 | bytes.len() as u8);
                result.extend_from_slice(&bytes);
                result
            }
        }
    }
}
