//! Mode change types.

use std::fmt;

/// How a mode character behaves, as decided by the server's classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Whether the mode consumes an argument with the given polarity.
    pub has_arg: bool,
    /// Whether the mode is a channel setting to be remembered, as opposed to
    /// a list entry or a per-user grant.
    pub persistent: bool,
}

/// One atomic mode mutation, e.g. `+k secret` or `-v alice`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModeChange {
    /// `true` for `+`, `false` for `-`.
    pub add: bool,
    /// The mode character.
    pub mode: char,
    /// Channel setting (stored in the channel's `ModeSet`) versus a list
    /// entry or transient permission grant.
    pub persistent: bool,
    /// Argument attached by position, if the mode takes one and one remained.
    pub arg: Option<String>,
}

impl ModeChange {
    /// Create a change with no argument.
    pub fn new(add: bool, mode: char, persistent: bool) -> Self {
        Self {
            add,
            mode,
            persistent,
            arg: None,
        }
    }

    /// Attach an argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    /// Short form without the argument, e.g. `+k` or `-b`.
    pub fn short(&self) -> String {
        format!("{}{}", if self.add { '+' } else { '-' }, self.mode)
    }
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short())?;
        match &self.arg {
            Some(arg) if !arg.is_empty() => write!(f, " {}", arg),
            _ => Ok(()),
        }
    }
}
