//! Encoding module for DLMS/COSEM protocol
//!
//! This crate provides the A-XDR encoder and the COSEM structures a client
//! attaches to a read request, such as the selective access descriptor of a
//! profile generic buffer read.

pub mod axdr;
pub mod cosem;

pub use axdr::AxdrEncoder;
pub use axdr::types::{AxdrTag, LengthEncoding};
pub use cosem::selective_access::{encode_range, RangeKind};
