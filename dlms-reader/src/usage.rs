use crate::error::ReaderError;

/// Usage text printed with every usage or validation error
pub const USAGE: &str = "\
Usage: dlms-read [options]
  -d device    serial connection string, port:baud[:framing] (e.g. /dev/ttyUSB0:9600:8N1)
  -m mode      server address size: 1, 2 or 4 bytes
  -c client    client address, 1-127
  -l logical   logical device address, 1-16383
  -p physical  physical device address, 0-16383
  -s level     security: 0 none, 1 low (password), 5 high (GMAC)
  -n           negotiate baud rate (IEC 62056-21 mode E)
  -w password  password as hex, at least 16 digits
  -e ekey      block cipher key as hex, 32 digits
  -a akey      authentication key as hex, 32 digits
  -i classId   class id of the element, 1-16383
  -o obis      logical name of the element, a.b.c.d.e.f
  -t attribute attribute index of the element, 1-32
  -r from-to   entry range (< 65536) or Unix time range (>= 946684800)
  -f file      load settings and elements from a config file
  -h           print this help
Output: one token per element, hex value or NULL, on a single line.";

/// Text written to stderr when a run ends with `error`
///
/// The diagnostic appears once; `-h` prints the usage text alone.
pub fn diagnostic(error: &ReaderError) -> String {
    let mut text = String::new();
    if !matches!(error, ReaderError::HelpRequested) {
        text.push_str(&error.to_string());
        text.push('\n');
    }
    if error.shows_usage() {
        text.push_str(USAGE);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlms_core::DlmsError;

    #[test]
    fn test_validation_diagnostic_printed_once() {
        let error = ReaderError::validation("3", "expected one of 0, 1, 5");
        let text = diagnostic(&error);
        assert_eq!(text.matches("invalid value '3'").count(), 1);
        assert!(text.starts_with("invalid value '3': expected one of 0, 1, 5\nUsage:"));
    }

    #[test]
    fn test_help_prints_usage_only() {
        assert_eq!(diagnostic(&ReaderError::HelpRequested), format!("{}\n", USAGE));
    }

    #[test]
    fn test_transport_diagnostic_has_no_usage() {
        let error = ReaderError::Transport(DlmsError::Protocol("no response to SNRM".to_string()));
        let text = diagnostic(&error);
        assert_eq!(text, "transport error: Protocol error: no response to SNRM\n");
    }
}
