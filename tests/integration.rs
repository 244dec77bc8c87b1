use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use notify_relay::{ClientId, ClientRegistry, Listener, RelayConfig};

struct TestClient {
    id: ClientId,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    // Helper to connect, announce a name and consume the acknowledgement
    async fn connect(addr: SocketAddr, name: &str) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let id = stream.local_addr().unwrap().port();
        let (read_half, write_half) = stream.into_split();
        let mut client = Self {
            id,
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        client.send(name).await;
        assert_eq!(client.recv().await.as_deref(), Some("connected"));
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn recv(&mut self) -> Option<String> {
        let mut line = String::new();
        let n = tokio::time::timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a line")
            .unwrap();
        (n > 0).then(|| line.trim_end_matches('\n').to_string())
    }

    /// Asserts nothing arrives within a short window.
    async fn expect_silence(&mut self) {
        let mut line = String::new();
        let read =
            tokio::time::timeout(Duration::from_millis(150), self.reader.read_line(&mut line)).await;
        assert!(read.is_err(), "unexpected data: {:?}", line);
    }
}

// Start a relay on an ephemeral loopback port
async fn start_relay() -> (SocketAddr, Arc<ClientRegistry>) {
    let registry = Arc::new(ClientRegistry::new());
    let config = RelayConfig {
        bind_address: "127.0.0.1".into(),
        port: 0,
    };
    let listener = Listener::bind(&config, Arc::clone(&registry)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(listener.run());
    (addr, registry)
}

async fn wait_for_ids(registry: &ClientRegistry, expected: &[ClientId]) {
    let mut expected = expected.to_vec();
    expected.sort_unstable();
    for _ in 0..500 {
        let ids: Vec<ClientId> = registry.snapshot().await.iter().map(|c| c.id()).collect();
        if ids == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("registry never reached {:?}", expected);
}

#[tokio::test]
async fn test_alice_and_bob() {
    let (addr, registry) = start_relay().await;

    let mut alice = TestClient::connect(addr, "alice").await;
    let mut bob = TestClient::connect(addr, "bob").await;
    wait_for_ids(&registry, &[alice.id, bob.id]).await;

    alice.send("hello").await;
    assert_eq!(bob.recv().await.as_deref(), Some("hello"));
    alice.expect_silence().await;

    drop(alice);
    wait_for_ids(&registry, &[bob.id]).await;

    let listing: Vec<String> = registry
        .snapshot()
        .await
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(listing, vec![format!("{} (bob)", bob.id)]);
}

#[tokio::test]
async fn test_fan_out_preserves_sender_order() {
    let (addr, registry) = start_relay().await;

    let mut clients = Vec::new();
    for name in ["a", "b", "c", "d"] {
        clients.push(TestClient::connect(addr, name).await);
    }
    let ids: Vec<ClientId> = clients.iter().map(|c| c.id).collect();
    wait_for_ids(&registry, &ids).await;

    for i in 0..5 {
        clients[0].send(&format!("line {}", i)).await;
    }

    for receiver in clients.iter_mut().skip(1) {
        for i in 0..5 {
            assert_eq!(receiver.recv().await, Some(format!("line {}", i)));
        }
    }
    clients[0].expect_silence().await;
}

#[tokio::test]
async fn test_unnamed_connection_never_registers() {
    let (addr, registry) = start_relay().await;
    let mut bob = TestClient::connect(addr, "bob").await;
    wait_for_ids(&registry, &[bob.id]).await;

    let mut silent = TcpStream::connect(addr).await.unwrap();
    silent.write_all(b"no newline").await.unwrap();
    silent.shutdown().await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    wait_for_ids(&registry, &[bob.id]).await;
    bob.expect_silence().await;
}

#[tokio::test]
async fn test_deleted_client_stops_receiving() {
    let (addr, registry) = start_relay().await;

    let mut alice = TestClient::connect(addr, "alice").await;
    let mut bob = TestClient::connect(addr, "bob").await;
    wait_for_ids(&registry, &[alice.id, bob.id]).await;

    assert!(registry.delete(bob.id).await.is_some());
    assert_eq!(bob.recv().await, None);
    assert!(registry.delete(bob.id).await.is_none());

    alice.send("anyone?").await;
    wait_for_ids(&registry, &[alice.id]).await;
    alice.expect_silence().await;
}
