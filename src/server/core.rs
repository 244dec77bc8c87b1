use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::client::{ClientRegistry, handle_connection};
use crate::error::RelayError;
use crate::server::config::RelayConfig;

/// Accepts client connections and spawns one session task per connection.
pub struct Listener {
    listener: TcpListener,
    client_registry: Arc<ClientRegistry>,
}

impl Listener {
    pub async fn bind(
        config: &RelayConfig,
        client_registry: Arc<ClientRegistry>,
    ) -> Result<Self, RelayError> {
        let addr = config.listen_socket();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| RelayError::Bind { addr, source })?;

        Ok(Self {
            listener,
            client_registry,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop. Only returns on an accept failure, which the
    /// caller logs; sessions already spawned keep running.
    pub async fn run(self) -> Result<(), RelayError> {
        info!("Listening on port {} ...", self.local_addr()?.port());

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let client_registry = Arc::clone(&self.client_registry);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(handle_connection(stream, addr, client_registry));
                }
                Err(e) => return Err(RelayError::Accept(e)),
            }
        }
    }
}
