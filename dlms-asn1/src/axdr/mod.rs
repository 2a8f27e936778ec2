//! A-XDR encoding module

pub mod encoder;
pub mod types;

pub use encoder::AxdrEncoder;
pub use types::{AxdrTag, LengthEncoding};
