//! Connection management module

pub mod connection;
pub mod serial_connection;
pub mod settings;
