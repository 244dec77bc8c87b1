//! Control terminal mode switching
//!
//! The console reads single keystrokes in raw mode and drops back to the
//! terminal's original (cooked) configuration while the operator types a
//! prompted answer.

use std::io;
use std::os::fd::RawFd;

use crate::error::TerminalError;

/// Mode switching for the terminal the console reads from.
pub trait TerminalControl: Send + Sync {
    /// Non-canonical, no-echo, one byte per read.
    fn set_raw_mode(&self) -> Result<(), TerminalError>;

    /// Reapplies the configuration captured at startup. Idempotent.
    fn restore(&self) -> Result<(), TerminalError>;
}

/// A real terminal device, identified by file descriptor.
pub struct TerminalMode {
    fd: RawFd,
    original: libc::termios,
}

impl TerminalMode {
    /// Captures the current settings of `fd` as the configuration to restore.
    pub fn capture(fd: RawFd) -> Result<Self, TerminalError> {
        // SAFETY: isatty only inspects the descriptor.
        if unsafe { libc::isatty(fd) } != 1 {
            return Err(TerminalError::NotATerminal(io::Error::last_os_error()));
        }

        // SAFETY: termios is plain data and is fully written by tcgetattr on success.
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
            return Err(TerminalError::Capture(io::Error::last_os_error()));
        }

        Ok(Self { fd, original })
    }

    /// Captures standard input.
    pub fn stdin() -> Result<Self, TerminalError> {
        Self::capture(libc::STDIN_FILENO)
    }

    /// Settings currently in effect on the device.
    pub fn current(&self) -> Result<libc::termios, TerminalError> {
        // SAFETY: see `capture`.
        let mut current: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(self.fd, &mut current) } != 0 {
            return Err(TerminalError::Capture(io::Error::last_os_error()));
        }
        Ok(current)
    }

    /// The settings captured at construction.
    pub fn original(&self) -> &libc::termios {
        &self.original
    }

    fn apply(&self, settings: &libc::termios) -> Result<(), TerminalError> {
        // SAFETY: settings points to a valid termios for the duration of the call.
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, settings) } != 0 {
            return Err(TerminalError::Apply(io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl TerminalControl for TerminalMode {
    fn set_raw_mode(&self) -> Result<(), TerminalError> {
        self.apply(&raw_settings(&self.original))
    }

    fn restore(&self) -> Result<(), TerminalError> {
        self.apply(&self.original)
    }
}

/// Derives raw settings from `base`. Signal keys and output processing are
/// left alone so Ctrl+C still interrupts and log lines still wrap.
pub fn raw_settings(base: &libc::termios) -> libc::termios {
    let mut raw = *base;
    raw.c_lflag &= !(libc::ICANON | libc::ECHO);
    raw.c_cc[libc::VMIN] = 1;
    raw.c_cc[libc::VTIME] = 0;
    raw
}

/// Stand-in used when the control input is not a terminal (piped or
/// redirected stdin). Mode changes do nothing.
pub struct DetachedTerminal;

impl TerminalControl for DetachedTerminal {
    fn set_raw_mode(&self) -> Result<(), TerminalError> {
        Ok(())
    }

    fn restore(&self) -> Result<(), TerminalError> {
        Ok(())
    }
}
