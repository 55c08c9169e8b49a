//! Test connectors.

use async_trait::async_trait;
use parking_lot::Mutex;
use slirc_client::Connector;
use slirc_client::client::BoxedStream;
use slirc_client::config::ServerConfig;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::DuplexStream;

/// Hands out queued in-memory streams, then refuses.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    streams: Arc<Mutex<VecDeque<DuplexStream>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a stream for the next connection attempt.
    pub fn push(&self, stream: DuplexStream) {
        self.streams.lock().push_back(stream);
    }

    /// Number of connection attempts so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _server: &ServerConfig) -> io::Result<BoxedStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stream = self.streams.lock().pop_front();
        match stream {
            Some(stream) => Ok(Box::new(stream)),
            None => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "no scripted stream left",
            )),
        }
    }
}

/// Always fails, counting attempts.
#[derive(Clone, Default)]
pub struct FailingConnector {
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FailingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FailingConnector {
    async fn connect(&self, _server: &ServerConfig) -> io::Result<BoxedStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
    }
}
