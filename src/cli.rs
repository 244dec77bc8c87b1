//! Command line arguments
//!
//! `-p <port>`, `-h` and `-v`. Anything else is reported back to the caller
//! and otherwise ignored.

use crate::error::ArgsError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command line options
#[derive(Debug, Default, PartialEq)]
pub struct Arguments {
    /// Listen port; overrides the configured one when present.
    pub port: Option<u16>,
    pub display_help: bool,
    pub display_version: bool,
    /// Options that were not recognised, in the order given.
    pub unknown: Vec<String>,
}

impl Arguments {
    /// Parses the arguments following the program name.
    pub fn parse<I>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut parsed = Arguments::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-p" => {
                    let value = args
                        .next()
                        .ok_or_else(|| ArgsError::MissingValue(arg.clone()))?;
                    let port = value
                        .parse::<u16>()
                        .map_err(|_| ArgsError::InvalidPort(value.clone()))?;
                    parsed.port = Some(port);
                }
                "-h" => parsed.display_help = true,
                "-v" => parsed.display_version = true,
                _ => parsed.unknown.push(arg),
            }
        }

        Ok(parsed)
    }
}

pub fn usage() -> &'static str {
    "Usage: notify-relay [-p port] [-h] [-v]
    -p Port to listen on. Default = 19725
    -v Display version
    -h Display help
"
}
