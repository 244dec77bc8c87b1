//! Logging utilities
//!
//! Provides logging setup and configuration.

use std::io::Write;

use env_logger::Env;

/// Setup logging for the relay
///
/// Defaults to `info`; `RUST_LOG` overrides. Lines look like
/// `2024-05-01T12:00:00Z | Listening on port 19725 ...`.
pub fn setup_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{} | {}", buf.timestamp_seconds(), record.args()))
        .init();
}
