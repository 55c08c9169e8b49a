//! Message source (the `:prefix` of a line).

use std::fmt;

/// Origin of an event, parsed from the leading `:prefix` of a line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    /// A server name, e.g. `irc.example.net`.
    Server(String),
    /// A user mask, e.g. `nick!ident@host`. Ident and host are optional.
    User {
        /// Nickname.
        nick: String,
        /// Ident (username), if present.
        ident: Option<String>,
        /// Hostname, if present.
        host: Option<String>,
    },
}

impl Source {
    /// Parse a prefix without its leading `:`.
    ///
    /// A token with no `!` or `@` that contains a `.` is treated as a server
    /// name; anything else is a user mask.
    pub fn parse(raw: &str) -> Self {
        if !raw.contains(['!', '@']) && raw.contains('.') {
            return Source::Server(raw.to_string());
        }

        let (rest, host) = match raw.split_once('@') {
            Some((rest, host)) => (rest, Some(host.to_string())),
            None => (raw, None),
        };
        let (nick, ident) = match rest.split_once('!') {
            Some((nick, ident)) => (nick, Some(ident.to_string())),
            None => (rest, None),
        };

        Source::User {
            nick: nick.to_string(),
            ident,
            host,
        }
    }

    /// Create a bare user source with only a nickname.
    pub fn nick(nick: impl Into<String>) -> Self {
        Source::User {
            nick: nick.into(),
            ident: None,
            host: None,
        }
    }

    /// The nickname, if this is a user source.
    pub fn nickname(&self) -> Option<&str> {
        match self {
            Source::User { nick, .. } => Some(nick),
            Source::Server(_) => None,
        }
    }

    /// The ident, if this is a user source that carries one.
    pub fn ident(&self) -> Option<&str> {
        match self {
            Source::User { ident, .. } => ident.as_deref(),
            Source::Server(_) => None,
        }
    }

    /// The host, if this is a user source that carries one.
    pub fn host(&self) -> Option<&str> {
        match self {
            Source::User { host, .. } => host.as_deref(),
            Source::Server(_) => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Server(name) => f.write_str(name),
            Source::User { nick, ident, host } => {
                f.write_str(nick)?;
                if let Some(ident) = ident {
                    write!(f, "!{}", ident)?;
                }
                if let Some(host) = host {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_user_mask() {
        let src = Source::parse("alice!ali@example.com");
        assert_eq!(src.nickname(), Some("alice"));
        assert_eq!(src.ident(), Some("ali"));
        assert_eq!(src.host(), Some("example.com"));
        assert_eq!(src.to_string(), "alice!ali@example.com");
    }

    #[test]
    fn test_server_name() {
        let src = Source::parse("irc.example.net");
        assert_eq!(src, Source::Server("irc.example.net".to_string()));
        assert_eq!(src.nickname(), None);
    }

    #[test]
    fn test_bare_nick() {
        assert_eq!(Source::parse("bob"), Source::nick("bob"));
    }

    #[test]
    fn test_nick_with_host_only() {
        let src = Source::parse("bob@host");
        assert_eq!(src.nickname(), Some("bob"));
        assert_eq!(src.ident(), None);
        assert_eq!(src.host(), Some("host"));
    }
}
