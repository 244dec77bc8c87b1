//! Client session management
//!
//! Drives one connection through its lifecycle:
//! `Connecting -> Registered -> Streaming -> Closed`.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpStream;

use crate::client::broadcast::ACKNOWLEDGEMENT;
use crate::client::{Broadcaster, Client, ClientId, ClientRegistry};

/// Lifecycle state of a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the name line.
    Connecting,
    /// Name received and client added to the registry.
    Registered,
    /// Relaying lines to the other clients.
    Streaming,
    /// Terminal state; the client is gone from the registry.
    Closed,
}

/// Owns one client connection for as long as it is open.
pub struct ClientSession<R> {
    id: ClientId,
    reader: BufReader<R>,
    registry: Arc<ClientRegistry>,
    broadcaster: Broadcaster,
    state: SessionState,
}

impl<R> ClientSession<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(id: ClientId, reader: R, registry: Arc<ClientRegistry>) -> Self {
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        Self {
            id,
            reader: BufReader::new(reader),
            registry,
            broadcaster,
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session to completion. `writer` is the write side of the
    /// same connection the session reads from.
    pub async fn run<W>(mut self, writer: W) -> SessionState
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let name = match read_line(&mut self.reader).await {
            Ok(Some(line)) => String::from_utf8_lossy(&line).into_owned(),
            Ok(None) => {
                debug!("Client {} closed before sending a name", self.id);
                self.transition(SessionState::Closed);
                return self.state;
            }
            Err(e) => {
                debug!("Failed to read name from {}: {}", self.id, e);
                self.transition(SessionState::Closed);
                return self.state;
            }
        };

        let client = Client::new(self.id, name, writer);

        // Acknowledge before registering so `connected` is always the first
        // line the client sees, ahead of any relayed peer line.
        if let Err(e) = client.send_line(ACKNOWLEDGEMENT).await {
            info!("Error while writing to client {}: {}", client, e);
            client.close().await;
            self.transition(SessionState::Closed);
            return self.state;
        }
        if let Err(e) = self.registry.add(client.clone()).await {
            warn!("Rejecting client {}: {}", client, e);
            client.close().await;
            self.transition(SessionState::Closed);
            return self.state;
        }
        self.transition(SessionState::Registered);
        info!("Client connect: {}", client);

        self.transition(SessionState::Streaming);
        self.stream(&client).await;

        self.registry.release(&client).await;
        client.close().await;
        self.transition(SessionState::Closed);
        info!("Client disconnect: {}", client);
        self.state
    }

    async fn stream(&mut self, client: &Client) {
        loop {
            tokio::select! {
                _ = client.closed() => {
                    debug!("Client {} closed by server", client.id());
                    break;
                }
                read = read_line(&mut self.reader) => match read {
                    Ok(Some(line)) => {
                        self.broadcaster.publish(&line, client.id()).await;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        info!("Error while reading from client {}: {}", client, e);
                        break;
                    }
                },
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }
}

/// Spawned by the listener for every accepted TCP connection.
pub async fn handle_connection(stream: TcpStream, addr: SocketAddr, registry: Arc<ClientRegistry>) {
    let (read_half, write_half) = stream.into_split();
    ClientSession::new(addr.port(), read_half, registry)
        .run(write_half)
        .await;
}

/// Reads one `\n`-terminated line, stripping the terminator and an optional
/// preceding `\r`. Returns `None` at end of stream, including when the stream
/// ends partway through a line.
async fn read_line<R>(reader: &mut BufReader<R>) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line).await?;
    if line.pop() != Some(b'\n') {
        return Ok(None);
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(Some(line))
}
