//! Scripted test server.
//!
//! The server end of an in-memory duplex stream. Tests read what the client
//! wrote and write replies line by line.

use slirc_proto::Event;
use std::time::Duration;
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf, split,
};
use tokio::time::timeout;

/// Buffer size for each direction of the in-memory pipe.
const PIPE_CAPACITY: usize = 64 * 1024;

/// The server side of one connection.
pub struct TestServer {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
}

impl TestServer {
    /// Create a connected pair: the server, and the stream to hand the
    /// client.
    pub fn pair() -> (Self, DuplexStream) {
        let (client_end, server_end) = tokio::io::duplex(PIPE_CAPACITY);
        let (read_half, write_half) = split(server_end);
        let server = Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        (server, client_end)
    }

    /// Send a raw line to the client.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send bytes exactly as given, for input that is not valid UTF-8.
    #[allow(dead_code)]
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single event from the client.
    ///
    /// The timeout outlasts the minimum reconnect delay so paused-clock
    /// tests can wait across a reconnect.
    pub async fn recv(&mut self) -> anyhow::Result<Event> {
        self.recv_timeout(Duration::from_secs(60)).await
    }

    /// Receive an event with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Event> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("client closed the connection");
        }
        line.trim_end()
            .parse::<Event>()
            .map_err(|e| anyhow::anyhow!("Parse error: {}", e))
    }

    /// Receive events until the given predicate returns true.
    #[allow(dead_code)]
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<Event>>
    where
        F: FnMut(&Event) -> bool,
    {
        let mut events = Vec::new();
        loop {
            let event = self.recv().await?;
            let done = predicate(&event);
            events.push(event);
            if done {
                break;
            }
        }
        Ok(events)
    }

    /// Read the client's registration and greet it with `RPL_WELCOME`.
    #[allow(dead_code)]
    pub async fn accept_registration(&mut self, nick: &str) -> anyhow::Result<Vec<Event>> {
        let events = self.recv_until(|e| e.command == "USER").await?;
        self.send_raw(&format!(":irc.test 001 {nick} :Welcome to the test network"))
            .await?;
        Ok(events)
    }

    /// Close the server side, as a crashed or disconnecting server would.
    #[allow(dead_code)]
    pub async fn close(mut self) {
        let _ = self.writer.shutdown().await;
    }
}
