//! Drives a connection through one read session
//!
//! open, initialize, read every element in order, close. A failed read only
//! affects its own element; a failed open or initialization ends the run.
//! Close is attempted on every path once the run has started.

use crate::args::parse_args;
use crate::error::{ReaderError, ReaderResult};
use crate::parameter::Parameter;
use dlms_client::{AttributeRequest, ClientSettings, Connection};
use dlms_core::DlmsResult;
use std::ffi::OsString;

/// Output token of an element whose read failed
pub const READ_FAILURE_MARKER: &str = "NULL";

/// Read every element of `parameter` over `connection`
///
/// The result holds one entry per element in configuration order; `None`
/// marks a failed read.
pub async fn run<C: Connection>(
    connection: &mut C,
    parameter: &Parameter,
) -> ReaderResult<Vec<Option<Vec<u8>>>> {
    let result = read_all(connection, parameter).await;
    if let Err(e) = connection.close().await {
        log::warn!("Failed to close connection: {}", e);
    }
    result
}

async fn read_all<C: Connection>(
    connection: &mut C,
    parameter: &Parameter,
) -> ReaderResult<Vec<Option<Vec<u8>>>> {
    connection.open().await.map_err(ReaderError::Transport)?;
    connection
        .initialize_connection()
        .await
        .map_err(ReaderError::Transport)?;

    let mut values = Vec::with_capacity(parameter.elements.len());
    for element in &parameter.elements {
        let request = AttributeRequest::from(element);
        match connection.read(&request).await {
            Ok(value) => {
                log::debug!(
                    "Read {}/{}/{}: {} byte(s)",
                    element.class_id,
                    element.obis,
                    element.attribute_index,
                    value.len()
                );
                values.push(Some(value));
            }
            Err(e) => {
                log::warn!(
                    "Read {}/{}/{} failed: {}",
                    element.class_id,
                    element.obis,
                    element.attribute_index,
                    e
                );
                values.push(None);
            }
        }
    }
    Ok(values)
}

/// Render read results as space-separated uppercase hex or `NULL` tokens
pub fn format_output(values: &[Option<Vec<u8>>]) -> String {
    values
        .iter()
        .map(|value| match value {
            Some(bytes) => hex::encode_upper(bytes),
            None => READ_FAILURE_MARKER.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse `args`, build a connection with `connect` and run the session
///
/// Returns the output line without the trailing newline.
pub async fn execute<I, T, F, C>(args: I, connect: F) -> ReaderResult<String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FnOnce(ClientSettings) -> DlmsResult<C>,
    C: Connection,
{
    let parameter = parse_args(args)?;
    log::info!(
        "Reading {} element(s) from {}",
        parameter.elements.len(),
        parameter.device
    );
    let mut connection = connect(parameter.client_settings())
        .map_err(|e| ReaderError::validation(&parameter.device, e.to_string()))?;
    let values = run(&mut connection, &parameter).await?;
    Ok(format_output(&values))
}
