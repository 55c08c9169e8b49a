//! The client handle.
//!
//! A [`Client`] is a cheap, cloneable handle to one logical connection:
//! - the session state, behind one read/write lock
//! - the callback registry
//! - the connection supervisor (see `supervisor`)
//! - the inbound event queue drained by [`Client::run`]
//!
//! Built-in handlers are registered at construction, before any user
//! handler.

mod commands;
mod query;
mod supervisor;
mod transport;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use slirc_proto::{Event, IrcCodec};
use tokio::io::{ReadHalf, WriteHalf};
use tokio::sync::{Notify, mpsc};
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::callback::{self, CallbackId, Handler, Registry};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::mode::UserPermissions;
use crate::session::SessionState;
use crate::telemetry::{DispatchTimer, spans};

pub use self::query::TemporaryHandlers;
pub use self::supervisor::backoff_delay;
pub use self::transport::{AsyncStream, BoxedStream, Connector, TcpConnector};

type Reader = FramedRead<ReadHalf<BoxedStream>, IrcCodec>;
type Writer = FramedWrite<WriteHalf<BoxedStream>, IrcCodec>;

/// Where the connection supervisor currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Quitting,
    /// Reconnect retries were exhausted. Terminal.
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Quitting => "quitting",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

pub(crate) struct Inner {
    config: Config,
    connector: Arc<dyn Connector>,
    state: RwLock<SessionState>,
    registry: Registry,
    phase: Mutex<Phase>,
    writer: tokio::sync::Mutex<Option<Writer>>,
    /// Cancels the read loop of the current connection.
    conn_token: Mutex<Option<CancellationToken>>,
    /// Cancelled by `quit`; interrupts a pending reconnect sequence.
    session_token: Mutex<CancellationToken>,
    reconnecting: AtomicBool,
    /// Set to the attempt count once reconnecting gave up.
    exhausted: Mutex<Option<u32>>,
    events_tx: Mutex<Option<mpsc::Sender<Event>>>,
    events_rx: tokio::sync::Mutex<mpsc::Receiver<Event>>,
    stop: Notify,
    created: Instant,
}

/// Handle to an IRC client.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("server", &self.server())
            .field("phase", &self.status())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client that connects over TCP (and TLS when configured).
    pub fn new(config: Config) -> Self {
        Self::with_connector(config, TcpConnector)
    }

    /// Build a client with a custom transport.
    pub fn with_connector(config: Config, connector: impl Connector + 'static) -> Self {
        let (tx, rx) = mpsc::channel(config.timeouts.queue_capacity.max(1));
        let registry = Registry::new();
        callback::builtin::register(&registry, &config.features);

        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(SessionState::new(config.identity.nick.as_str())),
                connector: Arc::new(connector),
                registry,
                phase: Mutex::new(Phase::Disconnected),
                writer: tokio::sync::Mutex::new(None),
                conn_token: Mutex::new(None),
                session_token: Mutex::new(CancellationToken::new()),
                reconnecting: AtomicBool::new(false),
                exhausted: Mutex::new(None),
                events_tx: Mutex::new(Some(tx)),
                events_rx: tokio::sync::Mutex::new(rx),
                stop: Notify::new(),
                created: Instant::now(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    // === Status ===

    pub fn status(&self) -> Phase {
        *self.inner.phase.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state.read().is_connected()
    }

    /// `host:port` of the configured server.
    pub fn server(&self) -> String {
        self.inner.config.server.address()
    }

    /// When the current connection was established.
    pub fn connected_at(&self) -> ClientResult<DateTime<Utc>> {
        let state = self.inner.state.read();
        match state.conn_time() {
            Some(at) if state.is_connected() => Ok(at),
            _ => Err(ClientError::NotConnected),
        }
    }

    /// How long the current connection has been up.
    pub fn uptime(&self) -> ClientResult<Duration> {
        let since = Utc::now() - self.connected_at()?;
        Ok(since.to_std().unwrap_or_default())
    }

    /// How long ago this client was built.
    pub fn lifetime(&self) -> Duration {
        self.inner.created.elapsed()
    }

    // === Session state ===

    /// Read the session state under the shared lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.inner.state.read())
    }

    /// Mutate the session state under the exclusive lock. One call is one
    /// transition; never hold it across an await.
    pub(crate) fn update_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.inner.state.write())
    }

    pub fn nickname(&self) -> String {
        self.with_state(|s| s.nick().to_string())
    }

    /// Joined channels.
    pub fn channels(&self) -> Vec<String> {
        self.with_state(SessionState::channel_names)
    }

    pub fn is_in_channel(&self, channel: &str) -> bool {
        self.with_state(|s| s.is_in_channel(channel))
    }

    /// Rendered settings of a joined channel, e.g. `+ntk secret`.
    pub fn channel_modes(&self, channel: &str) -> Option<String> {
        self.with_state(|s| s.channel(channel).map(|c| c.modes.render()))
    }

    pub fn user_permissions(&self, channel: &str, nick: &str) -> Option<UserPermissions> {
        self.with_state(|s| s.user(nick).and_then(|u| u.permissions(channel)))
    }

    /// A server-advertised `RPL_ISUPPORT` option.
    pub fn server_option(&self, key: &str) -> Option<String> {
        self.with_state(|s| s.options().get(key).map(str::to_string))
    }

    // === Handlers ===

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Register a handler for a command, or [`callback::WILDCARD`] for all.
    pub fn add_handler(&self, command: &str, handler: impl Handler + 'static) -> CallbackId {
        self.inner.registry.add(command, handler)
    }

    /// Register a handler meant to be removed again by id.
    pub fn add_background_handler(
        &self,
        command: &str,
        handler: impl Handler + 'static,
    ) -> CallbackId {
        self.inner.registry.add_background(command, handler)
    }

    pub fn remove_handler(&self, id: CallbackId) -> bool {
        self.inner.registry.remove(id)
    }

    /// Dispatch an event through the registry as if it had been received.
    pub async fn run_callbacks(&self, event: &Event) {
        let span = spans::dispatch(&event.command, event.source_nick());
        let _timer = DispatchTimer::new(&event.command);
        self.inner.registry.dispatch(self, event).instrument(span).await;
    }

    // === Dispatch loop ===

    /// Drain the event queue, dispatching each event in order.
    ///
    /// Returns `Ok(())` after [`stop`](Self::stop), or
    /// [`ClientError::ReconnectExhausted`] once the supervisor gave up and
    /// closed the queue.
    pub async fn run(&self) -> ClientResult {
        let mut rx = self.inner.events_rx.lock().await;
        loop {
            tokio::select! {
                _ = self.inner.stop.notified() => break,
                event = rx.recv() => match event {
                    Some(event) => self.run_callbacks(&event).await,
                    None => break,
                },
            }
        }

        match *self.inner.exhausted.lock() {
            Some(attempts) => Err(ClientError::ReconnectExhausted { attempts }),
            None => Ok(()),
        }
    }

    /// Make [`run`](Self::run) return. The connection is left alone.
    pub fn stop(&self) {
        self.inner.stop.notify_one();
    }
}
