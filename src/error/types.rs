//! Error types
//!
//! Defines domain-specific error types for each module of the relay.

use std::fmt;
use std::io;

use crate::client::ClientId;

/// Client registry errors
#[derive(Debug)]
pub enum RegistryError {
    DuplicateId(ClientId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateId(id) => write!(f, "Client id already registered: {}", id),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Control terminal errors
#[derive(Debug)]
pub enum TerminalError {
    NotATerminal(io::Error),
    Capture(io::Error),
    Apply(io::Error),
}

impl fmt::Display for TerminalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalError::NotATerminal(e) => write!(f, "Control input is not a terminal: {}", e),
            TerminalError::Capture(e) => write!(f, "Failed to read terminal settings: {}", e),
            TerminalError::Apply(e) => write!(f, "Failed to apply terminal settings: {}", e),
        }
    }
}

impl std::error::Error for TerminalError {}

/// Command console errors
#[derive(Debug)]
pub enum ConsoleError {
    Input(io::Error),
    Output(io::Error),
    Terminal(TerminalError),
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Input(e) => write!(f, "Failed to read console input: {}", e),
            ConsoleError::Output(e) => write!(f, "Failed to write console output: {}", e),
            ConsoleError::Terminal(e) => write!(f, "Terminal error: {}", e),
        }
    }
}

impl std::error::Error for ConsoleError {}

impl From<TerminalError> for ConsoleError {
    fn from(error: TerminalError) -> Self {
        ConsoleError::Terminal(error)
    }
}

/// Command line argument errors
#[derive(Debug, PartialEq)]
pub enum ArgsError {
    MissingValue(String),
    InvalidPort(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue(opt) => write!(f, "Option {} requires a value", opt),
            ArgsError::InvalidPort(value) => write!(f, "Invalid port: {}", value),
        }
    }
}

impl std::error::Error for ArgsError {}

/// General relay error that encompasses all error types
#[derive(Debug)]
pub enum RelayError {
    Args(ArgsError),
    Config(config::ConfigError),
    Bind { addr: String, source: io::Error },
    Accept(io::Error),
    Console(ConsoleError),
    IoError(io::Error),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Args(e) => write!(f, "Argument error: {}", e),
            RelayError::Config(e) => write!(f, "Configuration error: {}", e),
            RelayError::Bind { addr, source } => write!(f, "Failed to bind to {}: {}", addr, source),
            RelayError::Accept(e) => write!(f, "Failed to accept connection: {}", e),
            RelayError::Console(e) => write!(f, "Console error: {}", e),
            RelayError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<ArgsError> for RelayError {
    fn from(error: ArgsError) -> Self {
        RelayError::Args(error)
    }
}

impl From<config::ConfigError> for RelayError {
    fn from(error: config::ConfigError) -> Self {
        RelayError::Config(error)
    }
}

impl From<ConsoleError> for RelayError {
    fn from(error: ConsoleError) -> Self {
        RelayError::Console(error)
    }
}

impl From<io::Error> for RelayError {
    fn from(error: io::Error) -> Self {
        RelayError::IoError(error)
    }
}
