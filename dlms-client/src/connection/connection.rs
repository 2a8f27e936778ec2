//! Connection trait for DLMS/COSEM client operations
//!
//! A connection is the client/session handle of the protocol engine. The read
//! tool drives it through four steps:
//! - **open**: open the physical channel (serial port)
//! - **initialize_connection**: link layer handshake and application association
//! - **read**: one GET per attribute, optionally with selective access
//! - **close**: release the association, the link and the channel
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use dlms_client::{AttributeRequest, Connection};
//! use dlms_core::ObisCode;
//!
//! # async fn demo(conn: &mut impl Connection) -> dlms_core::DlmsResult<()> {
//! conn.open().await?;
//! conn.initialize_connection().await?;
//! let request = AttributeRequest::new(3, ObisCode::new(1, 0, 1, 8, 0, 255), 2);
//! let value = conn.read(&request).await?;
//! conn.close().await?;
//! # Ok(())
//! # }
//! ```

use dlms_core::{DlmsResult, ObisCode};

/// One attribute read: the COSEM attribute descriptor plus optional access selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRequest {
    pub class_id: u16,
    pub logical_name: ObisCode,
    pub attribute_index: u8,
    /// Access selector byte followed by the A-XDR access parameters
    pub selective_access: Option<Vec<u8>>,
}

impl AttributeRequest {
    /// Create a request reading the whole attribute
    pub fn new(class_id: u16, logical_name: ObisCode, attribute_index: u8) -> Self {
        Self {
            class_id,
            logical_name,
            attribute_index,
            selective_access: None,
        }
    }
}

/// Connection trait for DLMS/COSEM client operations
///
/// # Errors
/// All operations return `DlmsResult`; a failed `read` only concerns that
/// attribute and leaves the connection usable.
#[async_trait::async_trait]
pub trait Connection: Send {
    /// Open the physical channel
    async fn open(&mut self) -> DlmsResult<()>;

    /// Establish the link layer and the application association
    async fn initialize_connection(&mut self) -> DlmsResult<()>;

    /// Read one attribute and return the encoded value bytes
    async fn read(&mut self, request: &AttributeRequest) -> DlmsResult<Vec<u8>>;

    /// Close all layers. Calling it on a closed connection is a no-op.
    async fn close(&mut self) -> DlmsResult<()>;

    /// Check if the connection is ready for reads
    fn is_open(&self) -> bool;
}

/// Connection state
///
/// Tracks the current state of a connection to ensure operations are only
/// performed when the connection is in the correct state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connection is closed (initial state)
    Closed,
    /// Physical channel is open, association not yet established
    TransportOpen,
    /// Association established, reads allowed
    Ready,
}

impl ConnectionState {
    /// Check if the connection is ready for operations
    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Ready)
    }

    /// Check if the link can be initialized
    pub fn can_initialize(&self) -> bool {
        matches!(self, ConnectionState::TransportOpen)
    }

    /// Check if the connection can be closed
    pub fn can_close(&self) -> bool {
        !matches!(self, ConnectionState::Closed)
    }
}
