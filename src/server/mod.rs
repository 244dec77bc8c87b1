//! Server core functionality
//!
//! This module contains the connection listener, its configuration, and
//! process shutdown handling.

pub mod config;
pub mod core;
pub mod shutdown;

pub use config::RelayConfig;
pub use core::Listener;
pub use shutdown::{ShutdownReason, install_panic_hook, shutdown, wait_for_shutdown};
