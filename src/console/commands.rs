//! Relay administration commands
//!
//! The console runs on its own OS thread; these commands reach the async
//! registry through a runtime handle.

use std::sync::Arc;

use log::warn;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::client::{ClientId, ClientRegistry};
use crate::console::command::Command;

pub const DELETE_PROMPT: &str = "Client to delete (enter port number)? ";

/// Builds the `d`, `p` and `q` commands.
///
/// `quit` receives a message when the operator presses `q`; whoever owns the
/// receiving end is responsible for shutting the process down.
pub fn relay_commands(
    registry: Arc<ClientRegistry>,
    runtime: Handle,
    quit: UnboundedSender<()>,
) -> Vec<Command> {
    let delete_registry = Arc::clone(&registry);
    let delete_runtime = runtime.clone();
    let delete_client = Command::prompting('d', "delete client", DELETE_PROMPT, move |answer, out| {
        let Ok(id) = answer.trim().parse::<ClientId>() else {
            return writeln!(out, "Invalid port number");
        };
        match delete_runtime.block_on(delete_registry.delete(id)) {
            Some(client) => writeln!(out, "Deleted client {}", client),
            None => writeln!(out, "Client {} not found", id),
        }
    });

    let print_clients = Command::immediate('p', "print clients", move |out| {
        for client in runtime.block_on(registry.snapshot()) {
            writeln!(out, "{}", client)?;
        }
        Ok(())
    });

    let quit_relay = Command::immediate('q', "quit", move |_| {
        if quit.send(()).is_err() {
            warn!("Quit requested but no shutdown handler is listening");
        }
        Ok(())
    });

    vec![delete_client, print_clients, quit_relay]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::console::CommandConsole;
    use crate::console::terminal::DetachedTerminal;
    use std::io::Cursor;
    use tokio::io::AsyncReadExt;
    use tokio::runtime::Runtime;
    use tokio::sync::mpsc;

    struct Fixture {
        runtime: Runtime,
        registry: Arc<ClientRegistry>,
        console: CommandConsole,
        quit: mpsc::UnboundedReceiver<()>,
    }

    fn fixture() -> Fixture {
        let runtime = Runtime::new().unwrap();
        let registry = Arc::new(ClientRegistry::new());
        let (tx, rx) = mpsc::unbounded_channel();

        let mut console = CommandConsole::new(Arc::new(DetachedTerminal));
        for command in relay_commands(Arc::clone(&registry), runtime.handle().clone(), tx) {
            console.register(command);
        }
        console.add_help_command('h');

        Fixture {
            runtime,
            registry,
            console,
            quit: rx,
        }
    }

    fn type_keys(fixture: &Fixture, keys: &str) -> String {
        let mut output = Vec::new();
        fixture
            .console
            .run(Cursor::new(keys.as_bytes()), &mut output)
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_print_clients_in_id_order() {
        let fixture = fixture();
        fixture.runtime.block_on(async {
            fixture.registry.add(Client::new(19802, "bob", tokio::io::sink())).await.unwrap();
            fixture.registry.add(Client::new(19801, "alice", tokio::io::sink())).await.unwrap();
        });

        assert_eq!(type_keys(&fixture, "p"), "19801 (alice)\n19802 (bob)\n");
    }

    #[test]
    fn test_delete_non_numeric_leaves_registry_unchanged() {
        let fixture = fixture();
        fixture.runtime.block_on(async {
            fixture.registry.add(Client::new(19801, "alice", tokio::io::sink())).await.unwrap();
        });

        let output = type_keys(&fixture, "dabc\n");
        assert_eq!(output, format!("{}Invalid port number\n", DELETE_PROMPT));
        assert_eq!(fixture.runtime.block_on(fixture.registry.len()), 1);
    }

    #[test]
    fn test_delete_closes_client_then_reports_not_found() {
        let fixture = fixture();
        let (local, mut remote) = tokio::io::duplex(64);
        fixture.runtime.block_on(async {
            fixture.registry.add(Client::new(19803, "carol", local)).await.unwrap();
        });

        let output = type_keys(&fixture, "d19803\nd19803\n");
        assert_eq!(
            output,
            format!(
                "{p}Deleted client 19803 (carol)\n{p}Client 19803 not found\n",
                p = DELETE_PROMPT
            )
        );
        assert!(fixture.runtime.block_on(fixture.registry.is_empty()));

        let mut rest = Vec::new();
        fixture.runtime.block_on(remote.read_to_end(&mut rest)).unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn test_quit_notifies_shutdown() {
        let mut fixture = fixture();
        type_keys(&fixture, "q");
        assert!(fixture.quit.try_recv().is_ok());
    }
}
