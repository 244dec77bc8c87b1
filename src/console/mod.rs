//! Operator console
//!
//! Single-keystroke administration of the running relay from the control
//! terminal.

pub mod command;
pub mod commands;
pub mod handler;
pub mod terminal;

/// Name of the thread that reads keystrokes from the control terminal.
pub const CONSOLE_THREAD: &str = "console";

pub use command::Command;
pub use commands::relay_commands;
pub use handler::CommandConsole;
pub use terminal::{DetachedTerminal, TerminalControl, TerminalMode};
