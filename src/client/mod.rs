//! Client management system
//!
//! Handles client connections, the shared registry, line fan-out and the
//! per-connection session lifecycle.

pub mod broadcast;
pub mod registry;
pub mod session;
pub mod state;

pub use broadcast::Broadcaster;
pub use registry::ClientRegistry;
pub use session::{ClientSession, SessionState, handle_connection};
pub use state::{Client, ClientId};
