//! dlms-read: read COSEM attributes from a DLMS/COSEM meter
//!
//! The crate turns command-line flags and/or a `tag = value` config file into
//! a validated [`Parameter`], then drives a [`dlms_client::Connection`] to read
//! every configured element in order.
//!
//! # Pipeline
//!
//! - [`validate`]: pure token checks shared by both front ends
//! - [`element`]: the element under construction and its completion rules
//! - [`parameter`]: the field rule table and the cross-field checks of `finalize`
//! - [`args`] / [`config_file`]: the two front ends
//! - [`orchestrator`]: open, initialize, read each element, close

pub mod args;
pub mod config_file;
pub mod element;
pub mod error;
pub mod orchestrator;
pub mod parameter;
pub mod usage;
pub mod validate;

pub use element::{ElementBuilder, ElementSpec};
pub use error::{ReaderError, ReaderResult};
pub use parameter::{Field, Parameter, ParameterBuilder};
