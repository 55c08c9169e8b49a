//! Event codec for tokio.
//!
//! Wraps [`LineCodec`] and parses lines into [`Event`]s. Lines that are too
//! long or do not parse are logged and skipped, so a `FramedRead` over this
//! codec only ends on I/O failure or EOF.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use tracing::warn;

use crate::error;
use crate::event::Event;
use crate::line::LineCodec;

/// Tokio codec for encoding/decoding protocol events.
#[derive(Default)]
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }
}

impl Decoder for IrcCodec {
    type Item = Event;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Event>> {
        loop {
            let line = match self.inner.decode(src) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "Skipping inbound line");
                    continue;
                }
                Err(e) => return Err(e),
            };
            // Blank keepalive lines carry nothing to dispatch.
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Event>() {
                Ok(event) => return Ok(Some(event)),
                Err(e) => warn!(error = %e, "Skipping unparsable line"),
            }
        }
    }
}

impl Encoder<Event> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, event: Event, dst: &mut BytesMut) -> error::Result<()> {
        self.inner.encode(event.to_string(), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_event() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(":n!u@h PRIVMSG #c :hello\r\n");
        let ev = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(ev.command, "PRIVMSG");
        assert_eq!(ev.trailing.as_deref(), Some("hello"));
    }

    #[test]
    fn test_decode_skips_blank_lines() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("\r\n\r\nPING :x\r\n");
        let ev = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(ev.command, "PING");
    }

    #[test]
    fn test_decode_skips_bad_lines() {
        let mut codec = IrcCodec::with_max_len(64);
        let long = format!("PRIVMSG #c :{}\r\n", "x".repeat(100));
        let mut buf = BytesMut::from(long.as_str());
        buf.extend_from_slice(b":bad!prefix\r\n");
        buf.extend_from_slice(b"PRIVMSG #c :caf\xe9 \x07\r\n");

        let ev = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(ev.command, "PRIVMSG");
        assert_eq!(ev.trailing.as_deref(), Some("caf\u{FFFD} \x07"));
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_encode_event() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(Event::new("NICK", ["bot"]), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"NICK bot\r\n");
    }
}
