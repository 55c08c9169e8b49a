//! The [`Event`] type: one protocol line, inbound or outbound.

use std::fmt;
use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};
use crate::source::Source;

/// Maximum number of parameters (middle plus trailing) a line may carry.
pub const MAX_PARAMS: usize = 15;

/// A single protocol message.
///
/// Produced by the codec for inbound lines and by the client when issuing
/// actions. Parameters are split the way the wire splits them: positional
/// `params`, then an optional free-text `trailing` parameter.
///
/// # Example
///
/// ```
/// use slirc_proto::Event;
///
/// let ev: Event = ":alice!a@host PRIVMSG #rust :hello there".parse().unwrap();
/// assert_eq!(ev.command, "PRIVMSG");
/// assert_eq!(ev.params, vec!["#rust"]);
/// assert_eq!(ev.trailing.as_deref(), Some("hello there"));
///
/// let out = Event::new("JOIN", ["#rust"]);
/// assert_eq!(out.to_string(), "JOIN #rust");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Who sent the line, when the server included a prefix.
    pub source: Option<Source>,
    /// Command token, upper-cased. Numerics stay as their three digits.
    pub command: String,
    /// Positional (middle) parameters.
    pub params: Vec<String>,
    /// Free-text trailing parameter.
    pub trailing: Option<String>,
    /// Suppresses wire logging (passwords and the like).
    pub sensitive: bool,
}

impl Event {
    /// Create an event with a command and positional parameters.
    pub fn new<I, S>(command: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: None,
            command: command.to_ascii_uppercase(),
            params: params.into_iter().map(Into::into).collect(),
            trailing: None,
            sensitive: false,
        }
    }

    /// Attach a trailing parameter.
    #[must_use]
    pub fn with_trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = Some(trailing.into());
        self
    }

    /// Attach a source.
    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    /// Mark the event as sensitive so it is never logged verbatim.
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Positional parameter at `idx`.
    pub fn param(&self, idx: usize) -> Option<&str> {
        self.params.get(idx).map(String::as_str)
    }

    /// The last parameter: the trailing one if present, else the last
    /// positional one.
    pub fn last(&self) -> Option<&str> {
        self.trailing
            .as_deref()
            .or_else(|| self.params.last().map(String::as_str))
    }

    /// Nickname of the sender, if the source is a user.
    pub fn source_nick(&self) -> Option<&str> {
        self.source.as_ref().and_then(Source::nickname)
    }

    /// Whether the sender's nickname equals `nick` (ASCII case-insensitive).
    pub fn is_from(&self, nick: &str) -> bool {
        self.source_nick()
            .is_some_and(|n| n.eq_ignore_ascii_case(nick))
    }

    /// Log-safe rendering. Sensitive events keep only their command.
    pub fn redacted(&self) -> String {
        if self.sensitive {
            format!("{} ***", self.command)
        } else {
            self.to_string()
        }
    }
}

fn needs_colon(param: &str) -> bool {
    param.is_empty() || param.starts_with(':') || param.contains(' ')
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, ":{} ", source)?;
        }
        f.write_str(&self.command)?;

        let count = self.params.len();
        for (i, param) in self.params.iter().enumerate() {
            // A last positional parameter that cannot stand as a middle one
            // is promoted to trailing when no explicit trailing exists.
            if i + 1 == count && self.trailing.is_none() && needs_colon(param) {
                return write!(f, " :{}", param);
            }
            write!(f, " {}", param)?;
        }

        if let Some(trailing) = &self.trailing {
            write!(f, " :{}", trailing)?;
        }
        Ok(())
    }
}

fn is_valid_command(cmd: &str) -> bool {
    (!cmd.is_empty() && cmd.bytes().all(|b| b.is_ascii_alphabetic()))
        || (cmd.len() == 3 && cmd.bytes().all(|b| b.is_ascii_digit()))
}

impl FromStr for Event {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        let mut rest = s.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
        if rest.trim().is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        // IRCv3 tags are accepted but not retained.
        if rest.starts_with('@') {
            rest = match rest.split_once(' ') {
                Some((_, after)) => after.trim_start_matches(' '),
                None => return Err(invalid(MessageParseError::MissingCommand)),
            };
        }

        let mut source = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (prefix, after) = match stripped.split_once(' ') {
                Some(pair) => pair,
                None => return Err(invalid(MessageParseError::MissingCommand)),
            };
            source = Some(Source::parse(prefix));
            rest = after.trim_start_matches(' ');
        }

        let (command, mut rest) = match rest.split_once(' ') {
            Some((cmd, after)) => (cmd, after),
            None => (rest, ""),
        };
        if command.is_empty() {
            return Err(invalid(MessageParseError::MissingCommand));
        }
        if !is_valid_command(command) {
            return Err(invalid(MessageParseError::InvalidCommand(
                command.to_string(),
            )));
        }

        let mut params = Vec::new();
        let mut trailing = None;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(text) = rest.strip_prefix(':') {
                trailing = Some(text.to_string());
                break;
            }
            match rest.split_once(' ') {
                Some((param, after)) => {
                    params.push(param.to_string());
                    rest = after;
                }
                None => {
                    params.push(rest.to_string());
                    break;
                }
            }
        }

        let total = params.len() + usize::from(trailing.is_some());
        if total > MAX_PARAMS {
            return Err(invalid(MessageParseError::TooManyParams(total)));
        }

        Ok(Event {
            source,
            command: command.to_ascii_uppercase(),
            params,
            trailing,
            sensitive: false,
        })
    }
}
