//! DLMS/COSEM client implementation
//!
//! This crate provides the client-side seam between the read tool and the
//! protocol engine: the `Connection` trait, the settings it is configured
//! with, and the serial connection used by the `dlms-read` binary.

pub mod connection;

pub use connection::connection::{AttributeRequest, Connection, ConnectionState};
pub use connection::serial_connection::SerialConnection;
pub use connection::settings::{
    AddressSize, ClientSettings, SecurityLevel, SecuritySetup, ServerAddress, DEDICATED_KEY,
    PUBLIC_CLIENT_ADDRESS, SYSTEM_TITLE,
};
