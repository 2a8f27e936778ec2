//! Request parameters and the rule table both front ends feed
//!
//! A command-line flag and a config file tag map to the same [`Field`], and
//! [`ParameterBuilder::apply`] is the only place a field value is validated.
//! Cross-field invariants are checked once, in [`ParameterBuilder::finalize`].

use crate::element::ElementSpec;
use crate::error::{ReaderError, ReaderResult};
use crate::validate::{self, HexLength};
use dlms_client::{
    AddressSize, ClientSettings, SecurityLevel, SecuritySetup, ServerAddress,
    PUBLIC_CLIENT_ADDRESS,
};

/// Shortest syntactically valid device connection string
pub const MIN_DEVICE_LENGTH: usize = 15;

/// Minimum password length in bytes for low level security
pub const MIN_PASSWORD_BYTES: usize = 8;

/// Key length in bytes for high level security
pub const KEY_BYTES: usize = 16;

/// Scalar parameter fields shared by flags and config file tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Device,
    Mode,
    Client,
    Logical,
    Physical,
    Level,
    Negotiate,
    Password,
    CipherKey,
    AuthKey,
}

impl Field {
    /// Look up a config file tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "device" => Some(Field::Device),
            "mode" => Some(Field::Mode),
            "client" => Some(Field::Client),
            "logical" => Some(Field::Logical),
            "physical" => Some(Field::Physical),
            "level" => Some(Field::Level),
            "negotiate" => Some(Field::Negotiate),
            "password" => Some(Field::Password),
            "ekey" => Some(Field::CipherKey),
            "akey" => Some(Field::AuthKey),
            _ => None,
        }
    }
}

/// Validated, immutable request description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub device: String,
    pub client_address: u8,
    pub server_address: ServerAddress,
    pub security: SecuritySetup,
    pub negotiate_baud: bool,
    /// Read order
    pub elements: Vec<ElementSpec>,
}

impl Parameter {
    /// Settings handed to the connection
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            device: self.device.clone(),
            client_address: self.client_address,
            server_address: self.server_address,
            security: self.security.clone(),
            negotiate_baud: self.negotiate_baud,
        }
    }
}

/// Accumulates fields from the front ends
#[derive(Debug, Clone)]
pub struct ParameterBuilder {
    device: Option<String>,
    mode: u8,
    client: u8,
    logical: u16,
    physical: u16,
    level: SecurityLevel,
    negotiate: bool,
    password: Option<Vec<u8>>,
    cipher_key: Option<Vec<u8>>,
    auth_key: Option<Vec<u8>>,
    elements: Vec<ElementSpec>,
}

impl Default for ParameterBuilder {
    fn default() -> Self {
        Self {
            device: None,
            mode: AddressSize::One as u8,
            client: PUBLIC_CLIENT_ADDRESS,
            logical: 1,
            physical: 0,
            level: SecurityLevel::None,
            negotiate: false,
            password: None,
            cipher_key: None,
            auth_key: None,
            elements: Vec::new(),
        }
    }
}

impl ParameterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `token` for `field` and store it; a later value replaces an earlier one
    pub fn apply(&mut self, field: Field, token: &str) -> ReaderResult<()> {
        match field {
            Field::Device => {
                if token.is_empty() {
                    return Err(ReaderError::validation(token, "empty device string"));
                }
                self.device = Some(token.to_string());
            }
            Field::Mode => self.mode = validate::int_one_of(token, &[1, 2, 4])? as u8,
            Field::Client => self.client = validate::int_in_range(token, 1, 127)? as u8,
            Field::Logical => self.logical = validate::int_in_range(token, 1, 16383)? as u16,
            Field::Physical => self.physical = validate::int_in_range(token, 0, 16383)? as u16,
            Field::Level => {
                let code = validate::int_one_of(token, &[0, 1, 5])? as u8;
                self.level = SecurityLevel::from_code(code)
                    .map_err(|e| ReaderError::validation(token, e.to_string()))?;
            }
            Field::Negotiate => self.negotiate = validate::boolean(token)?,
            Field::Password => {
                self.password = Some(validate::hex_bytes(token, HexLength::AtLeast(2 * MIN_PASSWORD_BYTES))?)
            }
            Field::CipherKey => {
                self.cipher_key = Some(validate::hex_bytes(token, HexLength::Exactly(2 * KEY_BYTES))?)
            }
            Field::AuthKey => {
                self.auth_key = Some(validate::hex_bytes(token, HexLength::Exactly(2 * KEY_BYTES))?)
            }
        }
        Ok(())
    }

    /// Append a completed element; elements are read in insertion order
    pub fn push_element(&mut self, element: ElementSpec) {
        self.elements.push(element);
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check the cross-field invariants and freeze the parameters
    pub fn finalize(self) -> ReaderResult<Parameter> {
        let device = self.device.unwrap_or_default();
        if device.len() < MIN_DEVICE_LENGTH {
            return Err(ReaderError::validation(
                &device,
                format!("device string must be at least {} characters", MIN_DEVICE_LENGTH),
            ));
        }

        let size = AddressSize::from_code(self.mode)
            .map_err(|e| ReaderError::validation(&self.mode.to_string(), e.to_string()))?;
        let server_address = ServerAddress::new(size, self.logical, self.physical).map_err(|e| {
            ReaderError::validation(&format!("{}/{}", self.logical, self.physical), e.to_string())
        })?;

        match self.level {
            SecurityLevel::None => {}
            SecurityLevel::Low => {
                if !self.password.as_ref().is_some_and(|p| p.len() >= MIN_PASSWORD_BYTES) {
                    return Err(ReaderError::Incomplete(format!(
                        "security level 1 needs a password of at least {} bytes",
                        MIN_PASSWORD_BYTES
                    )));
                }
            }
            SecurityLevel::HighGmac => {
                let key_ok = |key: &Option<Vec<u8>>| key.as_ref().is_some_and(|k| k.len() == KEY_BYTES);
                if !key_ok(&self.cipher_key) || !key_ok(&self.auth_key) {
                    return Err(ReaderError::Incomplete(format!(
                        "security level 5 needs a {}-byte cipher key and authentication key",
                        KEY_BYTES
                    )));
                }
            }
        }

        if self.elements.is_empty() {
            return Err(ReaderError::Incomplete("no element to read".to_string()));
        }

        let mut security = SecuritySetup::new(self.level);
        security.password = self.password;
        security.block_cipher_key = self.cipher_key;
        security.authentication_key = self.auth_key;

        Ok(Parameter {
            device,
            client_address: self.client,
            server_address,
            security,
            negotiate_baud: self.negotiate,
            elements: self.elements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementBuilder;

    const DEVICE: &str = "/dev/ttyUSB0:9600:8N1";
    const KEY: &str = "000102030405060708090A0B0C0D0E0F";

    fn with_element() -> ParameterBuilder {
        let mut builder = ParameterBuilder::new();
        builder.apply(Field::Device, DEVICE).unwrap();
        builder.push_element(ElementBuilder::parse_line("3 1.0.1.8.0.255 2").unwrap());
        builder
    }

    #[test]
    fn test_defaults() {
        let parameter = with_element().finalize().unwrap();
        assert_eq!(parameter.device, DEVICE);
        assert_eq!(parameter.client_address, 16);
        assert_eq!(parameter.server_address.size(), AddressSize::One);
        assert_eq!(parameter.server_address.logical_id(), 1);
        assert_eq!(parameter.security.level, SecurityLevel::None);
        assert!(!parameter.negotiate_baud);
        assert_eq!(parameter.elements.len(), 1);
    }

    #[test]
    fn test_field_rules() {
        let mut builder = ParameterBuilder::new();
        assert!(builder.apply(Field::Mode, "3").is_err());
        assert!(builder.apply(Field::Mode, "4").is_ok());
        assert!(builder.apply(Field::Client, "128").is_err());
        assert!(builder.apply(Field::Logical, "0").is_err());
        assert!(builder.apply(Field::Logical, "16383").is_ok());
        assert!(builder.apply(Field::Physical, "0").is_ok());
        assert!(builder.apply(Field::Physical, "16384").is_err());
        assert!(builder.apply(Field::Level, "2").is_err());
        assert!(builder.apply(Field::Negotiate, "yes").is_err());
        assert!(builder.apply(Field::Device, "").is_err());
    }

    #[test]
    fn test_short_device_rejected() {
        let mut builder = with_element();
        builder.apply(Field::Device, "/dev/ttyS0:96").unwrap();
        assert!(builder.finalize().is_err());
        assert!(ParameterBuilder::new().finalize().is_err());
    }

    #[test]
    fn test_no_elements_rejected() {
        let mut builder = ParameterBuilder::new();
        builder.apply(Field::Device, DEVICE).unwrap();
        let err = builder.finalize().unwrap_err();
        assert_eq!(err.to_string(), "no element to read");
    }

    #[test]
    fn test_low_security_needs_password() {
        let mut builder = with_element();
        builder.apply(Field::Level, "1").unwrap();
        assert!(builder.clone().finalize().is_err());
        builder.apply(Field::Password, "3030303030303030").unwrap();
        let parameter = builder.finalize().unwrap();
        assert_eq!(parameter.security.password.as_deref(), Some(&b"00000000"[..]));
    }

    #[test]
    fn test_high_security_needs_both_keys() {
        let mut builder = with_element();
        builder.apply(Field::Level, "5").unwrap();
        builder.apply(Field::CipherKey, KEY).unwrap();
        assert!(builder.clone().finalize().is_err());
        builder.apply(Field::AuthKey, KEY).unwrap();
        let parameter = builder.finalize().unwrap();
        assert_eq!(parameter.security.level, SecurityLevel::HighGmac);
        assert_eq!(parameter.security.system_title, dlms_client::SYSTEM_TITLE);
    }

    #[test]
    fn test_oversize_address_falls_back_to_four_bytes() {
        for mode in ["1", "2"] {
            let mut builder = with_element();
            builder.apply(Field::Mode, mode).unwrap();
            builder.apply(Field::Logical, "200").unwrap();
            let address = builder.finalize().unwrap().server_address;
            assert_eq!(address.size(), AddressSize::Four);
            assert_eq!(address.resolve(), 200 << 14);
        }

        let mut builder = with_element();
        builder.apply(Field::Mode, "4").unwrap();
        builder.apply(Field::Logical, "200").unwrap();
        builder.apply(Field::Physical, "300").unwrap();
        let settings = builder.finalize().unwrap().client_settings();
        assert_eq!(settings.server_address.resolve(), (200 << 14) | 300);
    }

    #[test]
    fn test_small_address_keeps_mode() {
        let mut builder = with_element();
        builder.apply(Field::Mode, "2").unwrap();
        builder.apply(Field::Logical, "1").unwrap();
        builder.apply(Field::Physical, "17").unwrap();
        let address = builder.finalize().unwrap().server_address;
        assert_eq!(address.size(), AddressSize::Two);
        assert_eq!(address.resolve(), (1 << 7) | 17);
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(Field::from_tag("ekey"), Some(Field::CipherKey));
        assert_eq!(Field::from_tag("element"), None);
        assert_eq!(Field::from_tag("Device"), None);
    }
}
