//! Stream accessor trait for transport layer

use dlms_core::DlmsResult;
use async_trait::async_trait;

/// Stream accessor interface to the physical channel to a remote meter
///
/// Framing and the byte exchange belong to the link engine; the read tool only
/// owns the lifetime of the channel.
#[async_trait]
pub trait StreamAccessor: Send {
    /// Check if the stream is closed
    fn is_closed(&self) -> bool;

    /// Close the stream. Closing a closed stream is a no-op.
    async fn close(&mut self) -> DlmsResult<()>;
}

/// Transport layer trait that extends StreamAccessor
#[async_trait]
pub trait TransportLayer: StreamAccessor {
    /// Open the physical layer connection
    async fn open(&mut self) -> DlmsResult<()>;
}
