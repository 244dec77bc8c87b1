//! notify-relay - Entry Point
//!
//! Relays newline-delimited text between TCP clients, with a keystroke
//! console on the controlling terminal for administration.

use std::io;
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::mpsc;

use notify_relay::cli::{self, Arguments};
use notify_relay::client::ClientRegistry;
use notify_relay::console::{
    CONSOLE_THREAD, CommandConsole, DetachedTerminal, TerminalControl, TerminalMode,
    relay_commands,
};
use notify_relay::error::RelayError;
use notify_relay::error::handlers::{exit_code, handle_error};
use notify_relay::server::{self, Listener, RelayConfig};
use notify_relay::utils::logging::setup_logging;

const HELP_KEY: char = 'h';

#[tokio::main]
async fn main() {
    setup_logging();

    let args = match Arguments::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprint!("{}", cli::usage());
            std::process::exit(exit_code(&RelayError::Args(e)));
        }
    };
    for option in &args.unknown {
        info!("Unknown option: {}", option);
    }
    if args.display_help {
        print!("{}", cli::usage());
        return;
    }
    if args.display_version {
        println!("{}", cli::VERSION);
        return;
    }

    if let Err(e) = run(args).await {
        handle_error(&e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(args: Arguments) -> Result<(), RelayError> {
    let mut config = RelayConfig::load()?;
    if let Some(port) = args.port {
        config.port = port;
    }

    let registry = Arc::new(ClientRegistry::new());
    let listener = Listener::bind(&config, Arc::clone(&registry)).await?;
    tokio::spawn(async move {
        if let Err(e) = listener.run().await {
            handle_error(&e);
        }
    });

    let terminal: Arc<dyn TerminalControl> = match TerminalMode::stdin() {
        Ok(terminal) => Arc::new(terminal),
        Err(e) => {
            warn!("{}; keyboard commands will be line buffered", e);
            Arc::new(DetachedTerminal)
        }
    };
    server::install_panic_hook(Arc::clone(&terminal));

    let (quit_tx, quit_rx) = mpsc::unbounded_channel();
    let mut console = CommandConsole::new(Arc::clone(&terminal));
    for command in relay_commands(Arc::clone(&registry), tokio::runtime::Handle::current(), quit_tx) {
        console.register(command);
    }
    console.add_help_command(HELP_KEY);
    info!("Press {} to see a list of available keyboard commands", HELP_KEY);

    std::thread::Builder::new()
        .name(CONSOLE_THREAD.into())
        .spawn(move || match console.run(io::stdin().lock(), io::stdout()) {
            Ok(()) => info!("Console input closed; keyboard commands are unavailable"),
            Err(e) => handle_error(&RelayError::Console(e)),
        })?;

    let reason = server::wait_for_shutdown(quit_rx).await?;
    info!("Stopping relay ({:?})", reason);
    server::shutdown(&registry, terminal.as_ref()).await;
    std::process::exit(0);
}
