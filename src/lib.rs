//! slirc-client - Straylight IRC client engine
//!
//! Keeps one connection to an IRC server alive, tracks channel membership,
//! modes and permissions, and dispatches inbound events to registered
//! handlers.
//!
//! ```no_run
//! use slirc_client::{Client, Config, callback::handler_fn};
//!
//! # async fn demo() -> Result<(), slirc_client::ClientError> {
//! let client = Client::new(Config::new("irc.libera.chat", 6667, "slirc"));
//! client.add_handler("001", handler_fn(|client, _| async move {
//!     let _ = client.join("#rust").await;
//! }));
//! client.connect().await?;
//! client.run().await
//! # }
//! ```

pub mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod mode;
pub mod session;
pub mod telemetry;

pub use self::callback::{CallbackId, Handler};
pub use self::client::{Client, Connector, Phase, TcpConnector};
pub use self::config::Config;
pub use self::error::{ClientError, ClientResult};
pub use slirc_proto::{Event, Source};
