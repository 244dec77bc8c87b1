pub mod cli;
pub mod client;
pub mod console;
pub mod error;
pub mod server;
pub mod utils;

pub use client::{Broadcaster, Client, ClientId, ClientRegistry};
pub use console::CommandConsole;
pub use server::{Listener, RelayConfig};
