//! Command-line front end
//!
//! Flags are applied in the order they appear, so a flag given after `-f`
//! overrides the value the file set and a flag given before it is overridden
//! by the file. The element described by `-i`/`-o`/`-t`/`-r` is appended
//! after any elements the file defines.

use crate::config_file;
use crate::element::{ElementBuilder, ElementField};
use crate::error::{ReaderError, ReaderResult};
use crate::parameter::{Field, Parameter, ParameterBuilder};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::Path;

const HELP: &str = "help";
const NEGOTIATE: &str = "negotiate";

/// What a value-carrying flag feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Field(Field),
    Element(ElementField),
    ConfigFile,
}

const NEGOTIATE_TARGET: Target = Target::Field(Field::Negotiate);

const VALUE_FLAGS: &[(&str, char, Target)] = &[
    ("device", 'd', Target::Field(Field::Device)),
    ("mode", 'm', Target::Field(Field::Mode)),
    ("client", 'c', Target::Field(Field::Client)),
    ("logical", 'l', Target::Field(Field::Logical)),
    ("physical", 'p', Target::Field(Field::Physical)),
    ("level", 's', Target::Field(Field::Level)),
    ("password", 'w', Target::Field(Field::Password)),
    ("ekey", 'e', Target::Field(Field::CipherKey)),
    ("akey", 'a', Target::Field(Field::AuthKey)),
    ("class_id", 'i', Target::Element(ElementField::ClassId)),
    ("obis", 'o', Target::Element(ElementField::Obis)),
    ("attribute", 't', Target::Element(ElementField::AttributeIndex)),
    ("range", 'r', Target::Element(ElementField::Range)),
    ("file", 'f', Target::ConfigFile),
];

fn command() -> Command {
    let command = Command::new("dlms-read")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true)
        .arg(Arg::new(NEGOTIATE).short('n').action(ArgAction::SetTrue))
        .arg(Arg::new(HELP).short('h').action(ArgAction::SetTrue));

    VALUE_FLAGS.iter().fold(command, |command, (id, short, _)| {
        command.arg(
            Arg::new(*id)
                .short(*short)
                .value_name(*id)
                .action(ArgAction::Set)
                .num_args(1),
        )
    })
}

/// Parse the process arguments (program name first) into finalized parameters
pub fn parse_args<I, T>(args: I) -> ReaderResult<Parameter>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command()
        .try_get_matches_from(args)
        .map_err(|e| ReaderError::Usage(clap_message(&e)))?;
    if matches.get_flag(HELP) {
        return Err(ReaderError::HelpRequested);
    }

    let mut builder = ParameterBuilder::new();
    let mut element = ElementBuilder::new();
    for (target, value) in ordered_values(&matches) {
        match target {
            Target::Field(field) => builder.apply(field, value)?,
            Target::Element(field) => element.set(field, value)?,
            Target::ConfigFile => config_file::load_file(Path::new(value), &mut builder)?,
        }
    }
    if let Some(pending) = element.finish()? {
        builder.push_element(pending);
    }
    builder.finalize()
}

/// Values of all given flags, sorted by their position on the command line
fn ordered_values(matches: &ArgMatches) -> Vec<(Target, &str)> {
    let mut values: Vec<(usize, Target, &str)> = VALUE_FLAGS
        .iter()
        .filter_map(|(id, _, target)| {
            let value = matches.get_one::<String>(id)?;
            let index = matches.index_of(id)?;
            Some((index, *target, value.as_str()))
        })
        .collect();
    if matches.get_flag(NEGOTIATE) {
        let index = matches.index_of(NEGOTIATE).unwrap_or_default();
        values.push((index, NEGOTIATE_TARGET, "true"));
    }
    values.sort_by_key(|(index, ..)| *index);
    values.into_iter().map(|(_, target, value)| (target, value)).collect()
}

fn clap_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlms_client::{AddressSize, SecurityLevel};
    use dlms_core::ObisCode;
    use std::io::Write;

    const DEVICE: &str = "/dev/ttyUSB0:9600:8N1";

    fn parse(args: &[&str]) -> ReaderResult<Parameter> {
        parse_args(std::iter::once("dlms-read").chain(args.iter().copied()))
    }

    fn config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_full_command_line() {
        let parameter = parse(&[
            "-t", "2", "-d", DEVICE, "-m", "4", "-c", "1", "-l", "1", "-p", "17", "-s", "5",
            "-e", "000102030405060708090A0B0C0D0E0F", "-a", "000102030405060708090A0B0C0D0E0F",
            "-n", "-o", "1.0.99.1.0.255", "-i", "7", "-r", "946684800-946771200",
        ])
        .unwrap();
        assert_eq!(parameter.server_address.size(), AddressSize::Four);
        assert_eq!(parameter.server_address.physical_id(), 17);
        assert_eq!(parameter.security.level, SecurityLevel::HighGmac);
        assert!(parameter.negotiate_baud);
        assert_eq!(parameter.elements.len(), 1);
        assert_eq!(parameter.elements[0].obis, ObisCode::new(1, 0, 99, 1, 0, 255));
        assert_eq!(parameter.elements[0].selective_access.as_ref().map(|d| d[0]), Some(0x01));
    }

    #[test]
    fn test_wide_logical_address_in_short_mode() {
        for mode in ["1", "2"] {
            let parameter = parse(&[
                "-d", DEVICE, "-m", mode, "-l", "200", "-i", "3", "-o", "1.0.1.8.0.255", "-t", "2",
            ])
            .unwrap();
            assert_eq!(parameter.server_address.size(), AddressSize::Four);
            assert_eq!(parameter.server_address.resolve(), 200 << 14);
        }
    }

    #[test]
    fn test_signed_values_rejected() {
        let err = parse(&["-d", DEVICE, "-c", "+5", "-i", "3", "-o", "1.0.1.8.0.255", "-t", "2"])
            .unwrap_err();
        assert!(matches!(err, ReaderError::Validation { .. }));
        let err = parse(&["-d", DEVICE, "-i", "3", "-o", "+1.0.1.8.0.255", "-t", "2"]).unwrap_err();
        assert!(matches!(err, ReaderError::Validation { .. }));
    }

    #[test]
    fn test_invalid_security_level() {
        for level in ["2", "3", "x"] {
            let err = parse(&["-d", DEVICE, "-s", level, "-i", "3", "-o", "1.0.1.8.0.255", "-t", "2"])
                .unwrap_err();
            assert_eq!(err.exit_code(), 1);
            assert!(err.shows_usage());
        }
    }

    #[test]
    fn test_help_flag() {
        assert!(matches!(parse(&["-h"]), Err(ReaderError::HelpRequested)));
        assert!(matches!(parse(&["-d", DEVICE, "-h"]), Err(ReaderError::HelpRequested)));
    }

    #[test]
    fn test_unknown_flag_and_stray_token() {
        assert!(matches!(parse(&["-x", "1"]), Err(ReaderError::Usage(_))));
        assert!(matches!(parse(&["-d", DEVICE, "stray"]), Err(ReaderError::Usage(_))));
        assert!(matches!(parse(&["-d"]), Err(ReaderError::Usage(_))));
    }

    #[test]
    fn test_repeated_flag_keeps_last() {
        let parameter = parse(&[
            "-d", DEVICE, "-c", "5", "-c", "6", "-i", "3", "-o", "1.0.1.8.0.255", "-t", "2",
        ])
        .unwrap();
        assert_eq!(parameter.client_address, 6);
    }

    #[test]
    fn test_incomplete_element() {
        let err = parse(&["-d", DEVICE, "-i", "3", "-t", "2"]).unwrap_err();
        assert!(matches!(err, ReaderError::Incomplete(_)));
        assert!(matches!(parse(&["-d", DEVICE]), Err(ReaderError::Incomplete(_))));
    }

    #[test]
    fn test_config_file_merges_in_order() {
        let file = config("level = 1\npassword = 3030303030303030\nclient = 9\nelement = 3 1.0.1.8.0.255 2\n");
        let path = file.path().to_str().unwrap();

        let parameter = parse(&[
            "-c", "2", "-f", path, "-d", DEVICE, "-s", "0", "-i", "1", "-o", "0.0.42.0.0.255", "-t", "2",
        ])
        .unwrap();
        // -c before -f is overridden by the file, -s after -f overrides it.
        assert_eq!(parameter.client_address, 9);
        assert_eq!(parameter.security.level, SecurityLevel::None);
        assert_eq!(parameter.elements.len(), 2);
        assert_eq!(parameter.elements[0].class_id, 3);
        assert_eq!(parameter.elements[1].class_id, 1);
    }

    #[test]
    fn test_config_file_error_is_usage_error() {
        let file = config("element = 3 1.0.1.8.0.255\n");
        let err = parse(&["-f", file.path().to_str().unwrap()]).unwrap_err();
        assert!(matches!(err, ReaderError::Config { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
