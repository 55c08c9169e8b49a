//! Integration test common infrastructure.
//!
//! Provides an in-memory scripted server, connectors that hand the client
//! those in-memory streams (or fail on demand), and small helpers for
//! building configured clients.

pub mod connector;
pub mod server;

#[allow(unused_imports)]
pub use connector::{FailingConnector, ScriptedConnector};
#[allow(unused_imports)]
pub use server::TestServer;

use slirc_client::{Client, Config};

/// A client with a plaintext config pointing nowhere in particular.
#[allow(dead_code)]
pub fn test_config(nick: &str) -> Config {
    Config::new("irc.test.invalid", 6667, nick)
}

/// Spawn the dispatch loop for `client`.
#[allow(dead_code)]
pub fn spawn_run(client: &Client) -> tokio::task::JoinHandle<slirc_client::ClientResult> {
    let client = client.clone();
    tokio::spawn(async move { client.run().await })
}
