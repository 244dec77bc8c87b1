//! Client registry
//!
//! Tracks every client that has completed the name handshake, keyed and
//! ordered by client id.

use std::collections::BTreeMap;

use log::info;
use tokio::sync::Mutex;

use crate::client::{Client, ClientId};
use crate::error::RegistryError;

/// Registry for tracking connected clients.
///
/// All operations take `&self`; share it behind an `Arc`. The lock is only
/// held for map updates and clones, never across socket I/O.
pub struct ClientRegistry {
    clients: Mutex<BTreeMap<ClientId, Client>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(BTreeMap::new()),
        }
    }

    pub async fn add(&self, client: Client) -> Result<(), RegistryError> {
        let mut clients = self.clients.lock().await;
        if clients.contains_key(&client.id()) {
            return Err(RegistryError::DuplicateId(client.id()));
        }
        clients.insert(client.id(), client);
        Ok(())
    }

    pub async fn remove(&self, id: ClientId) -> Option<Client> {
        self.clients.lock().await.remove(&id)
    }

    /// Removes `client` only if the entry under its id is still that same
    /// connection. Returns whether anything was removed.
    pub async fn release(&self, client: &Client) -> bool {
        let mut clients = self.clients.lock().await;
        match clients.get(&client.id()) {
            Some(current) if current.same_connection(client) => {
                clients.remove(&client.id());
                true
            }
            _ => false,
        }
    }

    /// Ordered copy of the registered clients, ascending by id.
    pub async fn snapshot(&self) -> Vec<Client> {
        self.clients.lock().await.values().cloned().collect()
    }

    /// Removes the client and closes its connection.
    ///
    /// Returns the deleted client, or `None` if no client has that id.
    pub async fn delete(&self, id: ClientId) -> Option<Client> {
        let client = self.remove(id).await?;
        client.close().await;
        info!("Deleted client {}", client);
        Some(client)
    }

    /// Closes every registered connection. Returns how many were closed.
    pub async fn close_all(&self) -> usize {
        let clients = std::mem::take(&mut *self.clients.lock().await);
        for client in clients.values() {
            client.close().await;
        }
        clients.len()
    }

    pub async fn contains(&self, id: ClientId) -> bool {
        self.clients.lock().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.lock().await.is_empty()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
