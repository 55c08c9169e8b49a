//! Live channel mode state.

use std::fmt;

use super::table::ModeTable;
use super::types::ModeChange;

/// The persistent mode settings of one channel plus the classification
/// tables used to interpret incoming changes.
///
/// Invariant: at most one stored entry per mode character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModeSet {
    table: ModeTable,
    modes: Vec<ModeChange>,
}

impl ModeSet {
    /// Create an empty set using the given server classification.
    pub fn new(table: ModeTable) -> Self {
        Self {
            table,
            modes: Vec::new(),
        }
    }

    /// Classification tables in effect for this channel.
    pub fn table(&self) -> &ModeTable {
        &self.table
    }

    /// Stored settings, in the order they were first set.
    pub fn modes(&self) -> &[ModeChange] {
        &self.modes
    }

    /// Parse a flag string with this channel's classification.
    pub fn parse<S: AsRef<str>>(&self, flags: &str, args: &[S]) -> Vec<ModeChange> {
        self.table.parse_flags(flags, args)
    }

    /// Merge incoming changes into the stored settings.
    ///
    /// - A persistent `+x` replaces a stored `x` in place, or is appended.
    /// - A persistent `-x` removes a stored `x`.
    /// - Non-persistent changes (list entries, permission grants) are never
    ///   stored; callers handle them separately.
    pub fn merge(&mut self, changes: &[ModeChange]) {
        for change in changes.iter().filter(|c| c.persistent) {
            let existing = self.modes.iter().position(|m| m.mode == change.mode);
            match (change.add, existing) {
                (true, Some(idx)) => self.modes[idx] = change.clone(),
                (true, None) => self.modes.push(change.clone()),
                (false, Some(idx)) => {
                    self.modes.remove(idx);
                }
                (false, None) => {}
            }
        }
    }

    /// Whether a setting is stored, e.g. `has_mode('m')`.
    pub fn has_mode(&self, mode: char) -> bool {
        self.modes.iter().any(|m| m.mode == mode)
    }

    /// Argument of a stored setting, if it has a non-empty one.
    pub fn get(&self, mode: char) -> Option<&str> {
        self.modes
            .iter()
            .find(|m| m.mode == mode)
            .and_then(|m| m.arg.as_deref())
            .filter(|a| !a.is_empty())
    }

    /// Render the stored settings as a flag string followed by arguments,
    /// e.g. `+ntkl secret 25`. Empty when nothing is stored.
    pub fn render(&self) -> String {
        if self.modes.is_empty() {
            return String::new();
        }

        let mut out = String::with_capacity(self.modes.len() * 3 + 1);
        out.push('+');
        out.extend(self.modes.iter().map(|m| m.mode));
        for arg in self.modes.iter().filter_map(|m| m.arg.as_deref()) {
            if !arg.is_empty() {
                out.push(' ');
                out.push_str(arg);
            }
        }
        out
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
