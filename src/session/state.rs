//! Per-connection session snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::isupport::ServerOptions;
use crate::mode::{ModeChange, ModeSet, ModeTable, UserPermissions};

/// A joined channel and its live settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    /// Name as first seen (original case).
    pub name: String,
    pub modes: ModeSet,
}

/// A user seen in one of our channels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackedUser {
    pub nick: String,
    pub ident: Option<String>,
    pub host: Option<String>,
    /// Real name / gecos.
    pub name: Option<String>,
    /// Permissions keyed by lower-cased channel name.
    pub perms: HashMap<String, UserPermissions>,
}

impl TrackedUser {
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            ..Default::default()
        }
    }

    /// Permissions in `channel`, if the user is known to be there.
    pub fn permissions(&self, channel: &str) -> Option<UserPermissions> {
        self.perms.get(&fold(channel)).copied()
    }

    /// Lower-cased names of the channels this user shares with us.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.perms.keys().map(String::as_str)
    }
}

/// Everything derived from one connection.
///
/// Created fresh on every connect and only ever mutated under the client's
/// write lock, so readers always see a complete transition.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    nick: String,
    connected: bool,
    conn_time: Option<DateTime<Utc>>,
    channels: HashMap<String, Channel>,
    users: HashMap<String, TrackedUser>,
    options: ServerOptions,
}

/// Case-fold a nickname or channel name for use as a map key.
pub(crate) fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl SessionState {
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            ..Default::default()
        }
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Whether `nick` is us (case-insensitive).
    pub fn is_me(&self, nick: &str) -> bool {
        self.nick.eq_ignore_ascii_case(nick)
    }

    /// Change our own nickname, renaming our tracked entry with it.
    pub fn set_nick(&mut self, nick: &str) {
        let old = std::mem::replace(&mut self.nick, nick.to_string());
        self.rename_user(&old, nick);
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn conn_time(&self) -> Option<DateTime<Utc>> {
        self.conn_time
    }

    /// Mark the session live as of `at`.
    pub fn mark_connected(&mut self, at: DateTime<Utc>) {
        self.connected = true;
        self.conn_time = Some(at);
    }

    pub fn mark_disconnected(&mut self) {
        self.connected = false;
    }

    // === Server options ===

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ServerOptions {
        &mut self.options
    }

    /// Mode classification from the advertised `CHANMODES` and `PREFIX`,
    /// falling back to the defaults for anything missing or malformed.
    pub fn mode_table(&self) -> ModeTable {
        ModeTable::new(
            self.options.get("CHANMODES").unwrap_or_default(),
            self.options.get("PREFIX").unwrap_or_default(),
        )
    }

    // === Channels ===

    /// Start tracking a channel. Existing state is kept.
    pub fn add_channel(&mut self, name: &str) -> &mut Channel {
        let table = self.mode_table();
        self.channels.entry(fold(name)).or_insert_with(|| Channel {
            name: name.to_string(),
            modes: ModeSet::new(table),
        })
    }

    /// Stop tracking a channel and forget every user's membership in it.
    pub fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        let key = fold(name);
        let removed = self.channels.remove(&key)?;
        for user in self.users.values_mut() {
            user.perms.remove(&key);
        }
        self.users.retain(|_, u| !u.perms.is_empty());
        Some(removed)
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&fold(name))
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&fold(name))
    }

    pub fn is_in_channel(&self, name: &str) -> bool {
        self.channels.contains_key(&fold(name))
    }

    /// Names of joined channels, sorted for stable output.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.values().map(|c| c.name.clone()).collect();
        names.sort_unstable_by_key(|n| fold(n));
        names
    }

    // === Users ===

    pub fn user(&self, nick: &str) -> Option<&TrackedUser> {
        self.users.get(&fold(nick))
    }

    pub fn user_mut(&mut self, nick: &str) -> Option<&mut TrackedUser> {
        self.users.get_mut(&fold(nick))
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Record `nick` as a member of `channel`. The channel must be tracked.
    pub fn add_member(&mut self, channel: &str, nick: &str) -> Option<&mut TrackedUser> {
        if !self.is_in_channel(channel) {
            return None;
        }
        let user = self
            .users
            .entry(fold(nick))
            .or_insert_with(|| TrackedUser::new(nick));
        user.perms.entry(fold(channel)).or_default();
        Some(user)
    }

    /// Drop `nick` from `channel`; users left in no channels are forgotten.
    pub fn remove_member(&mut self, channel: &str, nick: &str) {
        let key = fold(nick);
        if let Some(user) = self.users.get_mut(&key) {
            user.perms.remove(&fold(channel));
            if user.perms.is_empty() {
                self.users.remove(&key);
            }
        }
    }

    /// Forget a user entirely (they quit).
    pub fn remove_user(&mut self, nick: &str) -> Option<TrackedUser> {
        self.users.remove(&fold(nick))
    }

    /// Re-key a user after a nickname change.
    pub fn rename_user(&mut self, old: &str, new: &str) {
        if let Some(mut user) = self.users.remove(&fold(old)) {
            user.nick = new.to_string();
            self.users.insert(fold(new), user);
        }
    }

    // === Modes ===

    /// Apply parsed changes to a channel: settings merge into its
    /// [`ModeSet`], permission modes update the target member.
    ///
    /// Returns `false` when the channel is not tracked.
    pub fn apply_channel_modes(&mut self, channel: &str, changes: &[ModeChange]) -> bool {
        let chan_key = fold(channel);
        let Some(chan) = self.channels.get_mut(&chan_key) else {
            return false;
        };
        chan.modes.merge(changes);

        let table = chan.modes.table().clone();
        for change in changes.iter().filter(|c| table.is_prefix_mode(c.mode)) {
            let Some(target) = change.arg.as_deref() else {
                continue;
            };
            if let Some(perms) = self
                .users
                .get_mut(&fold(target))
                .and_then(|u| u.perms.get_mut(&chan_key))
            {
                perms.apply_mode(change);
            }
        }
        true
    }

    /// Apply names-list prefix symbols to a member, replacing what was
    /// known. Unknown members are added.
    pub fn apply_member_prefix(&mut self, channel: &str, nick: &str, symbols: &str) {
        let chan_key = fold(channel);
        if let Some(user) = self.add_member(channel, nick) {
            if let Some(perms) = user.perms.get_mut(&chan_key) {
                perms.apply_prefix(symbols, false);
            }
        }
    }
}
