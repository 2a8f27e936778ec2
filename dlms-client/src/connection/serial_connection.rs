//! Connection over a local serial port
//!
//! `SerialConnection` owns the serial channel and the connection state. The
//! HDLC link, the association and the GET exchange are produced by a link
//! engine; this connection does not frame anything itself.

use super::connection::{AttributeRequest, Connection, ConnectionState};
use super::settings::ClientSettings;
use async_trait::async_trait;
use dlms_core::{DlmsError, DlmsResult};
use dlms_transport::{SerialSettings, SerialTransport, StreamAccessor, TransportLayer};

/// Client connection to a meter on a serial port
#[derive(Debug)]
pub struct SerialConnection {
    transport: SerialTransport,
    settings: ClientSettings,
    state: ConnectionState,
}

impl SerialConnection {
    /// Create a connection; the device string is parsed here, nothing is opened
    pub fn new(settings: ClientSettings) -> DlmsResult<Self> {
        let serial = SerialSettings::from_device_string(&settings.device)?
            .with_negotiation(settings.negotiate_baud);
        Ok(Self {
            transport: SerialTransport::new(serial),
            settings,
            state: ConnectionState::Closed,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    fn not_ready(&self, operation: &str) -> DlmsError {
        DlmsError::Connection(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            format!("Cannot {} in state {:?}", operation, self.state),
        ))
    }
}

#[async_trait]
impl Connection for SerialConnection {
    async fn open(&mut self) -> DlmsResult<()> {
        if self.state != ConnectionState::Closed {
            return Err(self.not_ready("open"));
        }
        self.transport.open().await?;
        self.state = ConnectionState::TransportOpen;
        Ok(())
    }

    /// Log the link parameters and report that no link engine is present
    ///
    /// HDLC framing, the association and ciphering are produced by an
    /// external link engine. Without one this returns `DlmsError::Protocol`,
    /// which the caller treats as a link initialization failure.
    async fn initialize_connection(&mut self) -> DlmsResult<()> {
        if !self.state.can_initialize() {
            return Err(self.not_ready("initialize the link"));
        }
        log::debug!(
            "Initializing link: client={} server=0x{:X} ({:?}) security={:?}",
            self.settings.client_address,
            self.settings.server_address.resolve(),
            self.settings.server_address.size(),
            self.settings.security.level
        );
        Err(DlmsError::Protocol(format!(
            "No HDLC link engine available to associate with {}",
            self.transport.settings().port_name
        )))
    }

    async fn read(&mut self, request: &AttributeRequest) -> DlmsResult<Vec<u8>> {
        if !self.state.is_ready() {
            return Err(self.not_ready("read"));
        }
        Err(DlmsError::Protocol(format!(
            "No link engine to read class {} {} attribute {}",
            request.class_id, request.logical_name, request.attribute_index
        )))
    }

    async fn close(&mut self) -> DlmsResult<()> {
        if !self.state.can_close() {
            return Ok(());
        }
        self.state = ConnectionState::Closed;
        if self.transport.is_closed() {
            return Ok(());
        }
        self.transport.close().await
    }

    fn is_open(&self) -> bool {
        self.state.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::settings::{AddressSize, SecurityLevel, SecuritySetup, ServerAddress};
    use dlms_core::ObisCode;

    fn settings(device: &str) -> ClientSettings {
        ClientSettings {
            device: device.to_string(),
            client_address: 16,
            server_address: ServerAddress::new(AddressSize::One, 1, 0).unwrap(),
            security: SecuritySetup::new(SecurityLevel::None),
            negotiate_baud: true,
        }
    }

    #[test]
    fn test_new_parses_device_string() {
        let conn = SerialConnection::new(settings("/dev/ttyUSB0:9600:8N1")).unwrap();
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert!(!conn.is_open());
        assert!(SerialConnection::new(settings("/dev/ttyUSB0")).is_err());
    }

    #[tokio::test]
    async fn test_operations_require_open_transport() {
        let mut conn = SerialConnection::new(settings("/dev/ttyUSB0:9600:8N1")).unwrap();
        assert!(conn.initialize_connection().await.is_err());
        let request = AttributeRequest::new(1, ObisCode::new(0, 0, 42, 0, 0, 255), 2);
        assert!(conn.read(&request).await.is_err());
        assert!(conn.close().await.is_ok());
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_failed_open_leaves_connection_closed() {
        let mut conn =
            SerialConnection::new(settings("/dev/dlms-read-no-such-port:9600")).unwrap();
        assert!(conn.open().await.is_err());
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert!(conn.close().await.is_ok());
    }
}
