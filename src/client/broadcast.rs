//! Line fan-out
//!
//! Delivers one line to every registered client except its sender.

use std::sync::Arc;

use log::warn;

use crate::client::{ClientId, ClientRegistry};

/// Literal line sent to a client once it has been registered.
pub const ACKNOWLEDGEMENT: &[u8] = b"connected";

#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ClientRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Writes `line` to every client but `origin`, in ascending id order.
    ///
    /// A failed write is logged and skipped; the failing client stays
    /// registered until its own session notices the broken connection.
    /// Returns the number of clients the line was delivered to.
    pub async fn publish(&self, line: &[u8], origin: ClientId) -> usize {
        let mut delivered = 0;
        for client in self.registry.snapshot().await {
            if client.id() == origin {
                continue;
            }
            match client.send_line(line).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Error while writing to client {}: {}", client, e),
            }
        }
        delivered
    }
}
