//! Error handlers
//!
//! Turns relay errors into log lines at the boundary where they surface.

use crate::error::types::RelayError;
use log::error;

/// Log a relay error
pub fn handle_error(err: &RelayError) {
    error!("Relay error: {}", err);
}

/// Process exit code for an error that stops the relay
pub fn exit_code(err: &RelayError) -> i32 {
    match err {
        RelayError::Args(_) => 2,
        RelayError::Config(_) => 1,
        RelayError::Bind { .. } => 1,
        RelayError::Accept(_) => 1,
        RelayError::Console(_) => 1,
        RelayError::IoError(_) => 1,
    }
}
