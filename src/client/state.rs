//! Module `state`
//!
//! Defines the `Client` struct: one registered connection, identified by the
//! origin port of its socket, along with the write side of that connection.

use std::fmt;
use std::io;
use std::sync::Arc;

use log::debug;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Registry key and display identity of a client: its connection's origin port.
pub type ClientId = u16;

type ClientWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Represents a connected client that has completed the name handshake.
///
/// Cloning is cheap. Clones share the same connection, so a registry
/// snapshot can write to clients without holding the registry lock.
#[derive(Clone)]
pub struct Client {
    id: ClientId,
    name: String,
    writer: Arc<Mutex<ClientWriter>>,
    cancel: CancellationToken,
}

impl Client {
    pub fn new<W>(id: ClientId, name: impl Into<String>, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            id,
            name: name.into(),
            writer: Arc::new(Mutex::new(Box::new(writer))),
            cancel: CancellationToken::new(),
        }
    }

    /// Returns the client id (origin port).
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Returns the name announced on the first line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writes `line` followed by a newline.
    ///
    /// The writer lock is held for the whole line, so concurrent publishers
    /// never interleave bytes on the same connection. A write stalled on a
    /// peer that stopped reading is abandoned as soon as the client is closed.
    pub async fn send_line(&self, line: &[u8]) -> io::Result<()> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line);
        buf.push(b'\n');

        let mut writer = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(closed_error()),
            writer = self.writer.lock() => writer,
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(closed_error()),
            written = async {
                writer.write_all(&buf).await?;
                writer.flush().await
            } => written,
        }
    }

    /// Closes the connection and wakes the owning session.
    ///
    /// Cancels any in-flight write first so the writer lock is released.
    /// Safe to call more than once.
    pub async fn close(&self) {
        self.cancel.cancel();

        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            debug!("Shutdown of client {} returned: {}", self.id, e);
        }
    }

    /// Resolves once `close` has been called on this client or any clone of it.
    pub async fn closed(&self) {
        self.cancel.cancelled().await;
    }

    /// Whether `other` refers to the same underlying connection.
    pub fn same_connection(&self, other: &Client) -> bool {
        Arc::ptr_eq(&self.writer, &other.writer)
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "client closed")
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.name)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_send_line_appends_newline() {
        let (local, mut remote) = tokio::io::duplex(64);
        let client = Client::new(4000, "alice", local);

        client.send_line(b"hello").await.unwrap();

        let mut buf = [0u8; 6];
        remote.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello\n");
    }

    #[tokio::test]
    async fn test_close_signals_session_and_ends_stream() {
        let (local, mut remote) = tokio::io::duplex(64);
        let client = Client::new(4001, "bob", local);
        let clone = client.clone();

        clone.close().await;
        client.closed().await;

        let mut rest = Vec::new();
        remote.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn test_close_abandons_stalled_write() {
        // An 8 byte pipe nobody drains: the write can never finish on its own.
        let (local, _remote) = tokio::io::duplex(8);
        let client = Client::new(4002, "stalled", local);
        let writer = client.clone();
        let writing = tokio::spawn(async move { writer.send_line(b"longer than the pipe").await });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        tokio::time::timeout(std::time::Duration::from_secs(2), client.close())
            .await
            .expect("close waited on a stalled write");

        let err = writing.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert!(client.send_line(b"late").await.is_err());
    }

    #[test]
    fn test_display_format() {
        let client = Client::new(19800, "", tokio::io::sink());
        assert_eq!(client.to_string(), "19800 ()");
    }

    #[test]
    fn test_same_connection() {
        let a = Client::new(1, "a", tokio::io::sink());
        let b = Client::new(1, "a", tokio::io::sink());
        assert!(a.same_connection(&a.clone()));
        assert!(!a.same_connection(&b));
    }
}
