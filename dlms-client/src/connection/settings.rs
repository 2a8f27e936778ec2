//! Client settings handed to the protocol engine
//!
//! Addresses, security material and the fixed ciphering constants of the
//! read tool.

use dlms_core::{DlmsError, DlmsResult};
use std::fmt;

/// Client system title used for ciphered associations
pub const SYSTEM_TITLE: [u8; 8] = [0x4D, 0x4D, 0x4D, 0x00, 0x00, 0xBC, 0x61, 0x4E];

/// Dedicated key proposed in the AARQ of a ciphered association
pub const DEDICATED_KEY: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE,
    0xFF,
];

/// Client address of the public client
pub const PUBLIC_CLIENT_ADDRESS: u8 = 0x10;

const ONE_BYTE_UPPER_BOUND: u16 = 0x7F;
const TWO_BYTE_UPPER_BOUND: u16 = 0x3FFF;

/// Authentication/ciphering level of the association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    /// Lowest level security, no authentication
    None = 0,
    /// Low level security, password authentication
    Low = 1,
    /// High level security with GMAC, authenticated encryption
    HighGmac = 5,
}

impl SecurityLevel {
    /// Map the numeric level used on the command line
    pub fn from_code(code: u8) -> DlmsResult<Self> {
        match code {
            0 => Ok(SecurityLevel::None),
            1 => Ok(SecurityLevel::Low),
            5 => Ok(SecurityLevel::HighGmac),
            other => Err(DlmsError::InvalidData(format!(
                "Unsupported security level {} (expected 0, 1 or 5)",
                other
            ))),
        }
    }
}

/// Number of bytes the server address occupies in an HDLC frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSize {
    One = 1,
    Two = 2,
    Four = 4,
}

impl AddressSize {
    pub fn from_code(code: u8) -> DlmsResult<Self> {
        match code {
            1 => Ok(AddressSize::One),
            2 => Ok(AddressSize::Two),
            4 => Ok(AddressSize::Four),
            other => Err(DlmsError::InvalidData(format!(
                "Unsupported address mode {} (expected 1, 2 or 4)",
                other
            ))),
        }
    }
}

/// Server (meter) address: logical device plus physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerAddress {
    size: AddressSize,
    logical_id: u16,
    physical_id: u16,
}

impl ServerAddress {
    /// Create a server address for the requested address size
    ///
    /// A one-byte address carries the logical device only; the physical
    /// address is not transmitted. When a part does not fit the requested
    /// size, the address falls back to the four-byte form. Only parts above
    /// `0x3FFF` are rejected.
    pub fn new(size: AddressSize, logical_id: u16, physical_id: u16) -> DlmsResult<Self> {
        if logical_id > TWO_BYTE_UPPER_BOUND || physical_id > TWO_BYTE_UPPER_BOUND {
            return Err(DlmsError::InvalidData(format!(
                "Address logical={} physical={} exceeds the four-byte server address",
                logical_id, physical_id
            )));
        }
        let fits = match size {
            AddressSize::One => logical_id <= ONE_BYTE_UPPER_BOUND,
            AddressSize::Two => {
                logical_id <= ONE_BYTE_UPPER_BOUND && physical_id <= ONE_BYTE_UPPER_BOUND
            }
            AddressSize::Four => true,
        };
        let size = if fits {
            size
        } else {
            log::debug!(
                "Address logical={} physical={} does not fit {} byte(s), using four-byte form",
                logical_id,
                physical_id,
                size as u8
            );
            AddressSize::Four
        };
        Ok(Self {
            size,
            logical_id,
            physical_id,
        })
    }

    /// Get logical ID
    pub fn logical_id(&self) -> u16 {
        self.logical_id
    }

    /// Get physical ID
    pub fn physical_id(&self) -> u16 {
        self.physical_id
    }

    /// Address size in effect after any fallback
    pub fn size(&self) -> AddressSize {
        self.size
    }

    /// Combined address value: upper part logical, lower part physical
    pub fn resolve(&self) -> u32 {
        let logical = u32::from(self.logical_id);
        let physical = u32::from(self.physical_id);
        match self.size {
            AddressSize::One => logical,
            AddressSize::Two => (logical << 7) | physical,
            AddressSize::Four => (logical << 14) | physical,
        }
    }
}

/// Security material of the association
#[derive(Clone, PartialEq, Eq)]
pub struct SecuritySetup {
    pub level: SecurityLevel,
    pub password: Option<Vec<u8>>,
    pub block_cipher_key: Option<Vec<u8>>,
    pub authentication_key: Option<Vec<u8>>,
    pub system_title: [u8; 8],
    pub dedicated_key: [u8; 16],
}

impl SecuritySetup {
    /// Setup with the fixed system title and dedicated key
    pub fn new(level: SecurityLevel) -> Self {
        Self {
            level,
            password: None,
            block_cipher_key: None,
            authentication_key: None,
            system_title: SYSTEM_TITLE,
            dedicated_key: DEDICATED_KEY,
        }
    }
}

// Keys and password stay out of logs.
impl fmt::Debug for SecuritySetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecuritySetup")
            .field("level", &self.level)
            .field("password", &self.password.as_ref().map(|_| "<set>"))
            .field("block_cipher_key", &self.block_cipher_key.as_ref().map(|_| "<set>"))
            .field("authentication_key", &self.authentication_key.as_ref().map(|_| "<set>"))
            .field("system_title", &self.system_title)
            .finish_non_exhaustive()
    }
}

/// Everything the engine needs to reach and associate with the meter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub device: String,
    pub client_address: u8,
    pub server_address: ServerAddress,
    pub security: SecuritySetup,
    pub negotiate_baud: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_level_codes() {
        assert_eq!(SecurityLevel::from_code(0).unwrap(), SecurityLevel::None);
        assert_eq!(SecurityLevel::from_code(1).unwrap(), SecurityLevel::Low);
        assert_eq!(SecurityLevel::from_code(5).unwrap(), SecurityLevel::HighGmac);
        assert!(SecurityLevel::from_code(2).is_err());
    }

    #[test]
    fn test_server_address_resolution() {
        let one = ServerAddress::new(AddressSize::One, 1, 500).unwrap();
        assert_eq!(one.resolve(), 1);

        let two = ServerAddress::new(AddressSize::Two, 1, 17).unwrap();
        assert_eq!(two.resolve(), (1 << 7) | 17);

        let four = ServerAddress::new(AddressSize::Four, 1, 0x3FFF).unwrap();
        assert_eq!(four.resolve(), (1 << 14) | 0x3FFF);
    }

    #[test]
    fn test_oversize_address_uses_four_byte_form() {
        let one = ServerAddress::new(AddressSize::One, 200, 5).unwrap();
        assert_eq!(one.size(), AddressSize::Four);
        assert_eq!(one.resolve(), (200 << 14) | 5);

        let two = ServerAddress::new(AddressSize::Two, 1, 0x80).unwrap();
        assert_eq!(two.size(), AddressSize::Four);
        assert_eq!(two.resolve(), (1 << 14) | 0x80);

        let fits = ServerAddress::new(AddressSize::Two, 0x7F, 0x7F).unwrap();
        assert_eq!(fits.size(), AddressSize::Two);
    }

    #[test]
    fn test_server_address_bounds() {
        assert!(ServerAddress::new(AddressSize::Four, 0x3FFF, 0x3FFF).is_ok());
        assert!(ServerAddress::new(AddressSize::Four, 0x4000, 0).is_err());
        assert!(ServerAddress::new(AddressSize::One, 1, 0x4000).is_err());
        assert!(AddressSize::from_code(3).is_err());
    }

    #[test]
    fn test_security_debug_hides_keys() {
        let mut setup = SecuritySetup::new(SecurityLevel::Low);
        setup.password = Some(b"secret12".to_vec());
        let text = format!("{:?}", setup);
        assert!(!text.contains("secret"));
        assert!(text.contains("<set>"));
    }
}
