//! Serial port transport implementation

use crate::stream::{StreamAccessor, TransportLayer};
use async_trait::async_trait;
use dlms_core::{DlmsError, DlmsResult};
use std::fmt;
use tokio::io::AsyncWriteExt;
use tokio_serial::SerialStream;

/// Baud rate used for the IEC 62056-21 opening sequence before negotiation
pub const NEGOTIATION_BAUD_RATE: u32 = 300;

/// Serial port transport layer settings
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: tokio_serial::DataBits,
    pub stop_bits: tokio_serial::StopBits,
    pub parity: tokio_serial::Parity,
    pub flow_control: tokio_serial::FlowControl,
    /// Open at `NEGOTIATION_BAUD_RATE` and let the link layer negotiate up
    pub negotiate_baud: bool,
}

impl SerialSettings {
    /// Create new serial settings with default parameters (8N1, no flow control)
    pub fn new(port_name: String, baud_rate: u32) -> Self {
        Self {
            port_name,
            baud_rate,
            data_bits: tokio_serial::DataBits::Eight,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::None,
            flow_control: tokio_serial::FlowControl::None,
            negotiate_baud: false,
        }
    }

    /// Parse a device connection string of the form `port:baud[:framing]`
    ///
    /// `framing` is data bits, parity and stop bits, e.g. `8N1` or `7E1`.
    pub fn from_device_string(device: &str) -> DlmsResult<Self> {
        let mut parts = device.split(':');
        let port_name = parts.next().filter(|p| !p.is_empty()).ok_or_else(|| {
            DlmsError::InvalidData(format!("Missing serial port name in '{}'", device))
        })?;
        let baud_rate = parts
            .next()
            .ok_or_else(|| DlmsError::InvalidData(format!("Missing baud rate in '{}'", device)))?
            .parse::<u32>()
            .ok()
            .filter(|baud| *baud > 0)
            .ok_or_else(|| DlmsError::InvalidData(format!("Invalid baud rate in '{}'", device)))?;

        let mut settings = Self::new(port_name.to_string(), baud_rate);
        if let Some(framing) = parts.next() {
            settings.apply_framing(framing)?;
        }
        if parts.next().is_some() {
            return Err(DlmsError::InvalidData(format!(
                "Unexpected trailing fields in '{}'",
                device
            )));
        }
        Ok(settings)
    }

    fn apply_framing(&mut self, framing: &str) -> DlmsResult<()> {
        let invalid = || DlmsError::InvalidData(format!("Invalid serial framing '{}'", framing));
        let bytes = framing.as_bytes();
        if bytes.len() != 3 {
            return Err(invalid());
        }

        self.data_bits = match bytes[0] {
            b'5' => tokio_serial::DataBits::Five,
            b'6' => tokio_serial::DataBits::Six,
            b'7' => tokio_serial::DataBits::Seven,
            b'8' => tokio_serial::DataBits::Eight,
            _ => return Err(invalid()),
        };
        self.parity = match bytes[1].to_ascii_uppercase() {
            b'N' => tokio_serial::Parity::None,
            b'E' => tokio_serial::Parity::Even,
            b'O' => tokio_serial::Parity::Odd,
            _ => return Err(invalid()),
        };
        self.stop_bits = match bytes[2] {
            b'1' => tokio_serial::StopBits::One,
            b'2' => tokio_serial::StopBits::Two,
            _ => return Err(invalid()),
        };
        Ok(())
    }

    /// Enable or disable baud rate negotiation
    pub fn with_negotiation(mut self, negotiate_baud: bool) -> Self {
        self.negotiate_baud = negotiate_baud;
        self
    }

    /// Baud rate the port is opened with
    pub fn opening_baud_rate(&self) -> u32 {
        if self.negotiate_baud {
            NEGOTIATION_BAUD_RATE
        } else {
            self.baud_rate
        }
    }
}

/// Wrapper for SerialStream that implements Debug
struct DebugSerialStream(SerialStream);

impl fmt::Debug for DebugSerialStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialStream").finish()
    }
}

/// Serial port transport layer implementation
///
/// The port is owned by the transport: dropping it releases the port even when
/// `close` was never reached.
#[derive(Debug)]
pub struct SerialTransport {
    stream: Option<DebugSerialStream>,
    settings: SerialSettings,
}

impl SerialTransport {
    /// Create a new serial transport layer
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            stream: None,
            settings,
        }
    }

    /// Get the settings the transport was created with
    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }
}

#[async_trait]
impl TransportLayer for SerialTransport {
    async fn open(&mut self) -> DlmsResult<()> {
        if self.stream.is_some() {
            return Err(DlmsError::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Connection has already been opened",
            )));
        }

        let baud_rate = self.settings.opening_baud_rate();
        let builder = tokio_serial::new(&self.settings.port_name, baud_rate)
            .data_bits(self.settings.data_bits)
            .stop_bits(self.settings.stop_bits)
            .parity(self.settings.parity)
            .flow_control(self.settings.flow_control);

        let stream = SerialStream::open(&builder).map_err(|e| {
            DlmsError::Connection(std::io::Error::other(format!(
                "Failed to open serial port {}: {}",
                self.settings.port_name, e
            )))
        })?;

        log::info!("Opened serial port {} at {} baud", self.settings.port_name, baud_rate);
        self.stream = Some(DebugSerialStream(stream));
        Ok(())
    }
}

#[async_trait]
impl StreamAccessor for SerialTransport {
    fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    async fn close(&mut self) -> DlmsResult<()> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.0.flush().await {
                log::warn!("Flushing serial port {} failed: {}", self.settings.port_name, e);
            }
            log::info!("Closed serial port {}", self.settings.port_name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_string_defaults() {
        let settings = SerialSettings::from_device_string("/dev/ttyUSB0:9600").unwrap();
        assert_eq!(settings.port_name, "/dev/ttyUSB0");
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.data_bits, tokio_serial::DataBits::Eight);
        assert_eq!(settings.parity, tokio_serial::Parity::None);
        assert_eq!(settings.stop_bits, tokio_serial::StopBits::One);
    }

    #[test]
    fn test_device_string_framing() {
        let settings = SerialSettings::from_device_string("/dev/ttyS1:2400:7E2").unwrap();
        assert_eq!(settings.baud_rate, 2400);
        assert_eq!(settings.data_bits, tokio_serial::DataBits::Seven);
        assert_eq!(settings.parity, tokio_serial::Parity::Even);
        assert_eq!(settings.stop_bits, tokio_serial::StopBits::Two);
    }

    #[test]
    fn test_device_string_errors() {
        assert!(SerialSettings::from_device_string("/dev/ttyUSB0").is_err());
        assert!(SerialSettings::from_device_string(":9600").is_err());
        assert!(SerialSettings::from_device_string("/dev/ttyUSB0:fast").is_err());
        assert!(SerialSettings::from_device_string("/dev/ttyUSB0:0").is_err());
        assert!(SerialSettings::from_device_string("/dev/ttyUSB0:9600:9N1").is_err());
        assert!(SerialSettings::from_device_string("/dev/ttyUSB0:9600:8N1:x").is_err());
    }

    #[test]
    fn test_negotiation_opens_slow() {
        let settings = SerialSettings::from_device_string("/dev/ttyUSB0:9600")
            .unwrap()
            .with_negotiation(true);
        assert_eq!(settings.opening_baud_rate(), NEGOTIATION_BAUD_RATE);
        assert_eq!(settings.with_negotiation(false).opening_baud_rate(), 9600);
    }

    #[tokio::test]
    async fn test_close_unopened_transport() {
        let mut transport =
            SerialTransport::new(SerialSettings::new("/dev/null-port".to_string(), 9600));
        assert!(transport.is_closed());
        assert!(transport.close().await.is_ok());
        assert!(transport.is_closed());
    }

    #[tokio::test]
    async fn test_open_missing_port_fails() {
        let mut transport = SerialTransport::new(SerialSettings::new(
            "/dev/dlms-read-no-such-port".to_string(),
            9600,
        ));
        assert!(matches!(transport.open().await, Err(DlmsError::Connection(_))));
        assert!(transport.is_closed());
    }
}
