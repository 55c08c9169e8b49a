//! Connection supervisor: connect, read loop, reconnect, quit.
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──ok──▶ Connected
//!      ▲                        │                  │ read error / idle
//!      │                      error                ▼
//!      └────────────────────────┘            Reconnecting ──retries exhausted──▶ Stopped
//!                                                  │
//!                          quit (from Connected or Reconnecting) ──▶ Quitting ──▶ Disconnected
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use futures_util::future::BoxFuture;
use futures_util::{FutureExt, SinkExt, StreamExt};
use slirc_proto::command::{NICK, PASS, QUIT, USER};
use slirc_proto::{Event, IrcCodec};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, warn};

use super::{Client, Phase, Reader};
use crate::config;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionState;
use crate::telemetry::spans;

/// Wait before retry `attempt` (1-based): `base * 2^(attempt - 1)`, capped
/// at `max`. Non-decreasing in `attempt`.
///
/// ```
/// use std::time::Duration;
/// use slirc_client::client::backoff_delay;
///
/// let base = Duration::from_secs(10);
/// let max = Duration::from_secs(60);
/// assert_eq!(backoff_delay(base, 1, max), Duration::from_secs(10));
/// assert_eq!(backoff_delay(base, 3, max), Duration::from_secs(40));
/// assert_eq!(backoff_delay(base, 9, max), max);
/// ```
pub fn backoff_delay(base: Duration, attempt: u32, max: Duration) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    base.saturating_mul(1 << exp).min(max)
}

/// Clears the reconnect guard when a reconnect sequence ends.
struct ReconnectGuard<'a>(&'a AtomicBool);

impl Drop for ReconnectGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Client {
    /// Validate the configuration, open the transport and register.
    ///
    /// Fails with [`ClientError::Config`] before any network activity when
    /// the configuration is invalid, and with
    /// [`ClientError::AlreadyConnecting`] while another attempt is in
    /// progress or a connection is up.
    pub async fn connect(&self) -> ClientResult {
        config::validate(&self.inner.config)?;

        {
            let mut phase = self.inner.phase.lock();
            match *phase {
                Phase::Disconnected => *phase = Phase::Connecting,
                Phase::Stopped => return Err(ClientError::Terminated),
                _ => return Err(ClientError::AlreadyConnecting),
            }
        }
        *self.inner.session_token.lock() = CancellationToken::new();

        let result = self.establish().await;
        if result.is_err() {
            self.set_phase(Phase::Disconnected);
        }
        result
    }

    /// Open the transport, reset session state, send the handshake and
    /// start the read loop.
    async fn establish(&self) -> ClientResult {
        let server = &self.inner.config.server;
        let identity = &self.inner.config.identity;
        info!(server = %server.address(), tls = server.tls.enabled, "Connecting");

        let stream = self.inner.connector.connect(server).await?;
        let (read_half, write_half) = tokio::io::split(stream);
        let reader = FramedRead::new(read_half, IrcCodec::new());

        *self.inner.state.write() = SessionState::new(identity.nick.as_str());
        let token = CancellationToken::new();
        if let Some(old) = self.inner.conn_token.lock().replace(token.clone()) {
            old.cancel();
        }
        *self.inner.writer.lock().await = Some(FramedWrite::new(write_half, IrcCodec::new()));

        if let Err(e) = self.handshake().await {
            self.teardown().await;
            return Err(e);
        }

        let tx = self.inner.events_tx.lock().clone();
        let Some(tx) = tx else {
            self.teardown().await;
            return Err(ClientError::Terminated);
        };
        let quitting = self.inner.session_token.lock().is_cancelled();
        if quitting {
            // Quit arrived while we were registering.
            self.teardown().await;
            return Err(ClientError::NotConnected);
        }

        self.update_state(|state| state.mark_connected(Utc::now()));
        self.set_phase(Phase::Connected);

        let span = spans::connection(&server.address(), &identity.nick);
        tokio::spawn(self.clone().read_loop(reader, token, tx).instrument(span));
        info!(server = %server.address(), nick = %identity.nick, "Connected");
        Ok(())
    }

    /// `PASS` (optional), `NICK`, `USER`, in that order.
    async fn handshake(&self) -> ClientResult {
        let server = &self.inner.config.server;
        let identity = &self.inner.config.identity;

        if let Some(password) = &server.password {
            self.write(Event::new(PASS, [password.as_str()]).sensitive())
                .await?;
        }
        self.write(Event::new(NICK, [identity.nick.as_str()])).await?;
        self.write(
            Event::new(USER, [identity.user.as_str(), "+iw", "*"])
                .with_trailing(identity.real_name()),
        )
        .await
    }

    async fn read_loop(self, mut reader: Reader, token: CancellationToken, tx: mpsc::Sender<Event>) {
        let idle = self.inner.config.timeouts.read_idle();

        let failure = loop {
            let next = tokio::select! {
                _ = token.cancelled() => return,
                next = tokio::time::timeout(idle, reader.next()) => next,
            };

            match next {
                Ok(Some(Ok(event))) => {
                    debug!("<-- {}", event.redacted());
                    tokio::select! {
                        _ = token.cancelled() => return,
                        sent = tx.send(event) => if sent.is_err() {
                            return;
                        },
                    }
                }
                // The codec skips malformed lines itself, so only I/O
                // failures surface here.
                Ok(Some(Err(e))) => break e.to_string(),
                Ok(None) => break "connection closed by server".to_string(),
                Err(_) => break format!("no data received for {}s", idle.as_secs()),
            }
        };

        if token.is_cancelled() {
            return;
        }
        warn!(error = %failure, "Read failed");
        drop(tx);
        drop(reader);
        // The outcome is already logged and reflected in the phase.
        let _ = self.reconnect().await;
    }

    /// Replace a failed connection.
    ///
    /// Closes the current transport, waits the configured delay, then makes
    /// up to `1 + max_retries` attempts with exponential backoff between
    /// them. A second call while one sequence is running, or a call after
    /// [`quit`](Self::quit), is a no-op. Exhausting the attempts stops the
    /// client: the event queue is closed and [`run`](Self::run) returns
    /// [`ClientError::ReconnectExhausted`].
    pub fn reconnect(&self) -> BoxFuture<'static, ClientResult> {
        let client = self.clone();
        async move { client.reconnect_sequence().await }.boxed()
    }

    async fn reconnect_sequence(&self) -> ClientResult {
        if self.inner.reconnecting.swap(true, Ordering::SeqCst) {
            debug!("Reconnect already in progress");
            return Ok(());
        }
        let _guard = ReconnectGuard(&self.inner.reconnecting);

        let session = self.inner.session_token.lock().clone();
        {
            let mut phase = self.inner.phase.lock();
            if session.is_cancelled() || matches!(*phase, Phase::Quitting | Phase::Stopped) {
                return Ok(());
            }
            *phase = Phase::Reconnecting;
        }
        self.teardown().await;

        let policy = &self.inner.config.reconnect;
        if policy.max_retries == 0 {
            return self.terminate(0);
        }

        let base = policy.delay();
        let total = policy.max_retries.saturating_add(1);
        for attempt in 1..=total {
            let delay = backoff_delay(base, attempt, policy.max_backoff());
            info!(attempt, of = total, delay_ms = delay.as_millis() as u64, "Reconnecting");
            tokio::select! {
                _ = session.cancelled() => return Ok(()),
                _ = tokio::time::sleep(delay) => {}
            }

            match self.establish().await {
                Ok(()) => return Ok(()),
                Err(_) if session.is_cancelled() => return Ok(()),
                Err(e) => {
                    warn!(attempt, error = %e, code = e.error_code(), "Reconnect attempt failed");
                    self.set_phase(Phase::Reconnecting);
                }
            }
        }

        self.terminate(total)
    }

    fn terminate(&self, attempts: u32) -> ClientResult {
        error!(attempts, "Reconnect retries exhausted, stopping client");
        *self.inner.exhausted.lock() = Some(attempts);
        self.set_phase(Phase::Stopped);
        self.inner.events_tx.lock().take();
        Err(ClientError::ReconnectExhausted { attempts })
    }

    /// Say goodbye and close the connection.
    ///
    /// Also interrupts a pending reconnect. Afterwards the client is
    /// disconnected and [`connect`](Self::connect) may be called again.
    pub async fn quit(&self, message: &str) {
        {
            let mut phase = self.inner.phase.lock();
            if *phase == Phase::Stopped {
                return;
            }
            *phase = Phase::Quitting;
        }
        self.inner.session_token.lock().cancel();

        if self.is_connected() {
            let farewell = Event::new(QUIT, Vec::<String>::new()).with_trailing(message);
            if let Err(e) = self.write(farewell).await {
                debug!(error = %e, "Failed to send QUIT");
            }
        }
        self.teardown().await;
        info!(message = %message, "Quit");

        {
            let mut phase = self.inner.phase.lock();
            if *phase == Phase::Quitting {
                *phase = Phase::Disconnected;
            }
        }
    }

    /// Stop the read loop and drop the transport.
    async fn teardown(&self) {
        if let Some(token) = self.inner.conn_token.lock().take() {
            token.cancel();
        }
        if let Some(mut writer) = self.inner.writer.lock().await.take() {
            let _ = writer.close().await;
        }
        self.update_state(SessionState::mark_disconnected);
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        *self.inner.phase.lock() = phase;
    }

    /// Write straight to the transport, without the connected check.
    pub(crate) async fn write(&self, event: Event) -> ClientResult {
        let mut writer = self.inner.writer.lock().await;
        let sink = writer.as_mut().ok_or(ClientError::NotConnected)?;
        debug!("--> {}", event.redacted());
        sink.send(event).await?;
        Ok(())
    }

    /// Send an event to the server.
    pub async fn send(&self, event: Event) -> ClientResult {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        self.write(event).await
    }

    /// Parse a raw protocol line and send it.
    pub async fn send_raw(&self, line: &str) -> ClientResult {
        let event: Event = line
            .parse()
            .map_err(|e: slirc_proto::ProtocolError| ClientError::InvalidEvent(e.to_string()))?;
        self.send(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_monotone_and_capped() {
        let base = Duration::from_secs(10);
        let max = Duration::from_secs(300);
        let delays: Vec<Duration> = (1..=12).map(|n| backoff_delay(base, n, max)).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(delays[0], base);
        assert_eq!(delays[1], Duration::from_secs(20));
        assert_eq!(*delays.last().unwrap(), max);
        assert_eq!(backoff_delay(base, u32::MAX, max), max);
    }
}
