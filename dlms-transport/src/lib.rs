//! Transport layer module for DLMS/COSEM protocol
//!
//! This crate provides the serial port channel the read tool talks over.

pub mod stream;
pub mod serial;

pub use dlms_core::{DlmsError, DlmsResult};
pub use stream::{StreamAccessor, TransportLayer};
pub use serial::{SerialSettings, SerialTransport, NEGOTIATION_BAUD_RATE};
