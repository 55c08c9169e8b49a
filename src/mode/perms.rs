//! Per-channel user permission flags.

use super::types::ModeChange;

/// Permission levels a user holds in one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct UserPermissions {
    pub owner: bool,
    pub admin: bool,
    pub op: bool,
    pub half_op: bool,
    pub voice: bool,
}

impl UserPermissions {
    /// Owner, admin or operator.
    pub fn is_admin(&self) -> bool {
        self.owner || self.admin || self.op
    }

    /// Any elevated level, including half-op and voice.
    pub fn is_trusted(&self) -> bool {
        self.is_admin() || self.half_op || self.voice
    }

    /// Clear every flag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a permission mode change such as `+o` or `-v`.
    ///
    /// Returns `false` when the mode is not a permission mode.
    pub fn apply_mode(&mut self, change: &ModeChange) -> bool {
        let slot = match change.mode {
            'q' => &mut self.owner,
            'a' => &mut self.admin,
            'o' => &mut self.op,
            'h' => &mut self.half_op,
            'v' => &mut self.voice,
            _ => return false,
        };
        *slot = change.add;
        true
    }

    /// Apply names-list prefix symbols (`~&@%+`).
    ///
    /// When `additive` is false the flags are reset first, so the result
    /// reflects exactly the given symbols. Unknown symbols are ignored.
    pub fn apply_prefix(&mut self, symbols: &str, additive: bool) {
        if !additive {
            self.reset();
        }
        for symbol in symbols.chars() {
            match symbol {
                '~' => self.owner = true,
                '&' => self.admin = true,
                '@' => self.op = true,
                '%' => self.half_op = true,
                '+' => self.voice = true,
                _ => {}
            }
        }
    }

    /// Highest prefix symbol held, e.g. `@` for an operator with voice.
    pub fn highest_prefix(&self) -> Option<char> {
        [
            (self.owner, '~'),
            (self.admin, '&'),
            (self.op, '@'),
            (self.half_op, '%'),
            (self.voice, '+'),
        ]
        .into_iter()
        .find_map(|(held, symbol)| held.then_some(symbol))
    }
}

/// Split a names-list token like `@+alice` into its prefix symbols and the
/// nickname, using the standard symbol set.
pub fn parse_user_prefix(token: &str) -> (&str, &str) {
    let idx = token
        .char_indices()
        .find(|(_, c)| !matches!(c, '~' | '&' | '@' | '%' | '+'))
        .map_or(token.len(), |(i, _)| i);
    token.split_at(idx)
}
