//! # slirc-proto
//!
//! Wire layer for the slirc client: the [`Event`] type, line framing and
//! parsing, and the grammar checks for nicknames, usernames and channels.
//!
//! ## Parsing and encoding
//!
//! ```rust
//! use slirc_proto::{Event, Source};
//!
//! let ev: Event = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
//! assert_eq!(ev.source_nick(), Some("nick"));
//!
//! let pong = Event::new("PONG", Vec::<String>::new()).with_trailing("irc.example.net");
//! assert_eq!(pong.to_string(), "PONG :irc.example.net");
//! ```
//!
//! With tokio, wrap a stream in `FramedRead`/`FramedWrite` using
//! [`IrcCodec`] to get a `Stream<Item = Result<Event, ProtocolError>>` and a
//! `Sink<Event>`.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod chan;
#[allow(missing_docs)]
pub mod command;
pub mod error;
pub mod event;
pub mod irc;
pub mod line;
pub mod nick;
#[allow(missing_docs)]
pub mod response;
pub mod source;

pub use self::chan::ChannelExt;
pub use self::error::{MessageParseError, ProtocolError};
pub use self::event::Event;
pub use self::irc::IrcCodec;
pub use self::line::LineCodec;
pub use self::nick::NickExt;
pub use self::source::Source;
