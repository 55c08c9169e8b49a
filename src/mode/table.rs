//! Server-advertised mode classification (`CHANMODES` and `PREFIX`).

use super::types::Classification;
use super::{DEFAULT_CHANMODES, DEFAULT_PREFIXES};

/// Classification tables for one server, built from its `CHANMODES` and
/// `PREFIX` tokens.
///
/// `CHANMODES` buckets:
/// - **A**: list modes (ban-style); always take an argument, never stored.
/// - **B**: settings that always take an argument.
/// - **C**: settings that take an argument only when set.
/// - **D**: settings that never take an argument.
///
/// `PREFIX` modes (op/voice-style) always take an argument and are not
/// stored as channel settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeTable {
    raw: String,
    list: String,
    always_arg: String,
    set_arg: String,
    no_arg: String,
    prefix_modes: String,
    prefix_symbols: String,
}

impl Default for ModeTable {
    fn default() -> Self {
        Self::new(DEFAULT_CHANMODES, DEFAULT_PREFIXES)
    }
}

impl ModeTable {
    /// Build a table. Invalid tokens are replaced by the built-in defaults.
    pub fn new(chanmodes: &str, prefixes: &str) -> Self {
        let chanmodes = if is_valid_chanmodes(chanmodes) {
            chanmodes
        } else {
            DEFAULT_CHANMODES
        };
        let (prefix_modes, prefix_symbols) = parse_prefixes(prefixes)
            .or_else(|| parse_prefixes(DEFAULT_PREFIXES))
            .unwrap_or_default();

        let mut buckets = chanmodes.splitn(4, ',').map(str::to_string);
        Self {
            raw: chanmodes.to_string(),
            list: buckets.next().unwrap_or_default(),
            always_arg: buckets.next().unwrap_or_default(),
            set_arg: buckets.next().unwrap_or_default(),
            no_arg: buckets.next().unwrap_or_default(),
            prefix_modes,
            prefix_symbols,
        }
    }

    /// The `CHANMODES` string this table was built from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The `PREFIX` string this table was built from, e.g. `(ov)@+`.
    pub fn prefix_spec(&self) -> String {
        format!("({}){}", self.prefix_modes, self.prefix_symbols)
    }

    /// Decide whether `mode` takes an argument and whether it is a stored
    /// channel setting. Unknown characters are treated as argument-less
    /// settings.
    pub fn classify(&self, add: bool, mode: char) -> Classification {
        let (has_arg, persistent) = if self.list.contains(mode) {
            (true, false)
        } else if self.always_arg.contains(mode) {
            (true, true)
        } else if self.set_arg.contains(mode) {
            (add, true)
        } else if self.no_arg.contains(mode) {
            (false, true)
        } else if self.prefix_modes.contains(mode) {
            (true, false)
        } else {
            (false, true)
        };
        Classification {
            has_arg,
            persistent,
        }
    }

    /// Whether `mode` is a permission-prefix mode on this server.
    pub fn is_prefix_mode(&self, mode: char) -> bool {
        self.prefix_modes.contains(mode)
    }

    /// Prefix symbol for a prefix mode, e.g. `o` → `@`.
    pub fn prefix_for_mode(&self, mode: char) -> Option<char> {
        self.prefix_modes
            .chars()
            .position(|c| c == mode)
            .and_then(|i| self.prefix_symbols.chars().nth(i))
    }

    /// Prefix mode for a prefix symbol, e.g. `+` → `v`.
    pub fn mode_for_prefix(&self, symbol: char) -> Option<char> {
        self.prefix_symbols
            .chars()
            .position(|c| c == symbol)
            .and_then(|i| self.prefix_modes.chars().nth(i))
    }

    /// Split a names-list token like `@+alice` into its prefix symbols and
    /// the nickname, using this server's symbols.
    pub fn split_prefixed<'a>(&self, token: &'a str) -> (&'a str, &'a str) {
        let idx = token
            .char_indices()
            .find(|(_, c)| !self.prefix_symbols.contains(*c))
            .map_or(token.len(), |(i, _)| i);
        token.split_at(idx)
    }
}

/// Validate a `CHANMODES` value: non-empty, only ASCII letters and commas.
pub fn is_valid_chanmodes(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(|c| c == ',' || c.is_ascii_alphabetic())
}

/// Validate a `PREFIX` value: `(modes)symbols` with equal counts.
pub fn is_valid_prefixes(raw: &str) -> bool {
    parse_prefixes(raw).is_some()
}

/// Split a `PREFIX` value into its mode characters and symbols.
///
/// ```
/// use slirc_client::mode::parse_prefixes;
///
/// assert_eq!(
///     parse_prefixes("(qaohv)~&@%+"),
///     Some(("qaohv".to_string(), "~&@%+".to_string()))
/// );
/// assert_eq!(parse_prefixes("(ov)@"), None);
/// assert_eq!(parse_prefixes("ov@+"), None);
/// ```
pub fn parse_prefixes(raw: &str) -> Option<(String, String)> {
    let inner = raw.strip_prefix('(')?;
    let (modes, symbols) = inner.split_once(')')?;
    if modes.chars().count() != symbols.chars().count() {
        return None;
    }
    Some((modes.to_string(), symbols.to_string()))
}
