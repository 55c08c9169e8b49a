//! Line-based codec for tokio.
//!
//! Frames newline-terminated lines and enforces the protocol's line length
//! limit on both partial and complete input.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Default maximum line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 512;

/// BEL is always illegal; other control characters are illegal unless they
/// are line terminators, NUL, or mIRC formatting codes.
pub(crate) fn is_illegal_control_char(ch: char) -> bool {
    if ch == '\x07' {
        return true;
    }
    let is_format_code = matches!(
        ch,
        '\x02' | '\x03' | '\x04' | '\x0F' | '\x11' | '\x16' | '\x1D' | '\x1E' | '\x1F'
    );
    // \x01 delimits CTCP payloads.
    ch.is_control()
        && ch != '\r'
        && ch != '\n'
        && ch != '\0'
        && ch != '\x01'
        && !is_format_code
}

/// Newline-delimited codec yielding lines without their terminator.
///
/// Inbound bytes are decoded lossily: invalid UTF-8 becomes U+FFFD and
/// control characters pass through untouched. Only outbound lines are
/// checked for illegal control characters.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
    /// Dropping the rest of an over-long line up to its newline.
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default 512-byte limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    fn validate_line(s: &str) -> error::Result<()> {
        match s.chars().find(|&ch| is_illegal_control_char(ch)) {
            Some(ch) => Err(ProtocolError::IllegalControlChar(ch)),
            None => Ok(()),
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if self.discarding {
            match src.iter().position(|b| *b == b'\n') {
                Some(offset) => {
                    let _ = src.split_to(offset + 1);
                    self.discarding = false;
                }
                None => {
                    src.clear();
                    return Ok(None);
                }
            }
        }

        let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();
            if src.len() > self.max_len {
                // The error is reported once; the remainder of the line is
                // dropped as it arrives.
                let actual = src.len();
                src.clear();
                self.next_index = 0;
                self.discarding = true;
                return Err(ProtocolError::MessageTooLong {
                    actual,
                    limit: self.max_len,
                });
            }
            return Ok(None);
        };

        let line = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;

        if line.len() > self.max_len {
            return Err(ProtocolError::MessageTooLong {
                actual: line.len(),
                limit: self.max_len,
            });
        }

        let data = String::from_utf8_lossy(&line);
        Ok(Some(data.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, mut line: String, dst: &mut BytesMut) -> error::Result<()> {
        // Anything after an embedded line break would be a second command.
        if let Some(pos) = line.find(['\r', '\n']) {
            line.truncate(pos);
        }
        Self::validate_line(&line)?;

        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_partial_then_complete() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :se");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"rver\r\nPONG");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :server".into()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(&buf[..], b"PONG");
    }

    #[test]
    fn test_decode_bare_lf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("NOTICE * :hi\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("NOTICE * :hi".into()));
    }

    #[test]
    fn test_decode_too_long() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from("PRIVMSG #chan :way too long");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::MessageTooLong { limit: 8, .. })
        ));
    }

    #[test]
    fn test_decode_too_long_then_recovers() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::from("PRIVMSG #chan :way too long");
        assert!(codec.decode(&mut buf).is_err());
        assert!(buf.is_empty());

        buf.extend_from_slice(b" still the same line\r\nPING :ok\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :ok".into()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_complete_too_long_line_is_consumed() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::from("PRIVMSG #chan :way too long\r\nPING :ok\r\n");
        assert!(codec.decode(&mut buf).is_err());
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :ok".into()));
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG #c :caf\xe9\r\n"[..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("PRIVMSG #c :caf\u{FFFD}".into())
        );
    }

    #[test]
    fn test_decode_keeps_control_chars() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PRIVMSG #c :ding\x07\r\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("PRIVMSG #c :ding\x07".into())
        );
    }

    #[test]
    fn test_encode_truncates_embedded_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode("PRIVMSG #c :hi\r\nQUIT".to_string(), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #c :hi\r\n");
    }

    #[test]
    fn test_encode_rejects_bell() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        assert!(matches!(
            codec.encode("PRIVMSG #c :\x07".to_string(), &mut buf),
            Err(ProtocolError::IllegalControlChar('\x07'))
        ));
    }

    #[test]
    fn test_ctcp_and_formatting_allowed() {
        assert!(!is_illegal_control_char('\x01'));
        assert!(!is_illegal_control_char('\x02'));
        assert!(is_illegal_control_char('\x07'));
        assert!(is_illegal_control_char('\x1B'));
    }
}
