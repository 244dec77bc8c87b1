//! Process shutdown
//!
//! The quit command and termination signals end up in the same cleanup
//! routine: put the control terminal back, then close every client.

use std::sync::Arc;

use log::{error, info};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::client::ClientRegistry;
use crate::console::{CONSOLE_THREAD, TerminalControl};

/// What ended the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Quit,
    Interrupt,
    Terminate,
}

/// Waits for the console quit command, SIGINT or SIGTERM.
///
/// A closed quit channel (the console ended on its own) is not a quit
/// request; the relay keeps running until a signal arrives.
pub async fn wait_for_shutdown(mut quit: UnboundedReceiver<()>) -> std::io::Result<ShutdownReason> {
    let quit_requested = async {
        match quit.recv().await {
            Some(()) => (),
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = quit_requested => Ok(ShutdownReason::Quit),
        signal = wait_for_signal() => signal,
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<ShutdownReason> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("Received SIGINT");
            Ok(ShutdownReason::Interrupt)
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM");
            Ok(ShutdownReason::Terminate)
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<ShutdownReason> {
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C");
    Ok(ShutdownReason::Interrupt)
}

/// Restores the control terminal and closes all client connections.
///
/// The terminal comes first so a slow client can never leave it raw.
/// Running it twice is harmless.
pub async fn shutdown(registry: &ClientRegistry, terminal: &dyn TerminalControl) {
    info!("Shutting down");
    if let Err(e) = terminal.restore() {
        error!("Failed to restore terminal: {}", e);
    }
    let closed = registry.close_all().await;
    if closed > 0 {
        info!("Closed {} client connection(s)", closed);
    }
}

/// Restores the terminal before the default panic report is printed.
///
/// Only panics on the main or console thread end the console; a panicking
/// session task leaves the relay (and the raw terminal) running.
pub fn install_panic_hook(terminal: Arc<dyn TerminalControl>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if panic_ends_console(std::thread::current().name()) {
            let _ = terminal.restore();
        }
        previous(info);
    }));
}

fn panic_ends_console(thread: Option<&str>) -> bool {
    thread == Some("main") || thread == Some(CONSOLE_THREAD)
}
