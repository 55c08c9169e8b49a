//! Built-in handlers.
//!
//! Registered once when a client is built, before any user handler, so
//! session state is up to date by the time user code sees an event.

use async_trait::async_trait;
use slirc_proto::command::{ERROR, JOIN, KICK, MODE, NICK, PART, PING, PONG, QUIT, WHO};
use slirc_proto::response::{
    ERR_NICKCOLLISION, ERR_NICKNAMEINUSE, ERR_UNAVAILRESOURCE, RPL_CHANNELMODEIS, RPL_ISUPPORT,
    RPL_NAMREPLY, RPL_WELCOME, RPL_WHOREPLY,
};
use slirc_proto::{ChannelExt, Event, NickExt, Source};
use tracing::{debug, info, warn};

use super::handler::Handler;
use super::registry::Registry;
use crate::client::Client;
use crate::config::FeaturesConfig;

/// Register the built-in handlers selected by `features`.
pub(crate) fn register(registry: &Registry, features: &FeaturesConfig) {
    registry.add(PING, PingHandler);
    registry.add(RPL_WELCOME, WelcomeHandler);
    registry.add(ERROR, ErrorHandler);

    if !features.disable_tracking {
        registry.add(JOIN, JoinHandler);
        registry.add(PART, PartHandler);
        registry.add(QUIT, QuitHandler);
        registry.add(KICK, KickHandler);
        registry.add(NICK, NickHandler);
        registry.add(MODE, ModeHandler);
        registry.add(RPL_CHANNELMODEIS, ChannelModeIsHandler);
        registry.add(RPL_NAMREPLY, NamesHandler);
        registry.add(RPL_WHOREPLY, WhoReplyHandler);
    }

    if !features.disable_cap_tracking {
        registry.add(RPL_ISUPPORT, IsupportHandler);
    }

    if !features.disable_nick_collision {
        for numeric in [ERR_NICKNAMEINUSE, ERR_NICKCOLLISION, ERR_UNAVAILRESOURCE] {
            registry.add(numeric, NickCollisionHandler);
        }
    }
}

/// All arguments of an event, trailing included.
fn args(event: &Event) -> Vec<&str> {
    event
        .params
        .iter()
        .map(String::as_str)
        .chain(event.trailing.as_deref())
        .collect()
}

// ============================================================================
// Connection
// ============================================================================

/// Answers server PINGs.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let token = event.last().unwrap_or_default();
        let pong = Event::new(PONG, Vec::<String>::new()).with_trailing(token);
        if let Err(e) = client.send(pong).await {
            debug!(error = %e, "Failed to answer PING");
        }
    }
}

/// Adopts the nickname the server registered us under.
pub struct WelcomeHandler;

#[async_trait]
impl Handler for WelcomeHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let Some(nick) = event.param(0) else {
            return;
        };
        client.update_state(|state| {
            if !state.is_me(nick) {
                state.set_nick(nick);
            }
        });
        info!(nick = %nick, "Registered");
    }
}

/// Logs `ERROR` lines; the read loop notices the closed socket itself.
pub struct ErrorHandler;

#[async_trait]
impl Handler for ErrorHandler {
    async fn handle(&self, _client: &Client, event: &Event) {
        warn!(message = event.last().unwrap_or_default(), "Server sent ERROR");
    }
}

/// Retries with `_` appended when the nickname is refused. The tracked
/// nickname is left alone until the server confirms a change.
pub struct NickCollisionHandler;

#[async_trait]
impl Handler for NickCollisionHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let rejected = event
            .param(1)
            .map(str::to_string)
            .unwrap_or_else(|| client.nickname());
        let candidate = format!("{rejected}_");
        if !candidate.is_valid_nick() {
            warn!(nick = %rejected, "Nickname refused and no alternative fits");
            return;
        }

        // Session state follows on 001 or on the server's NICK echo.
        info!(rejected = %rejected, candidate = %candidate, "Nickname refused, retrying");
        if let Err(e) = client.write(Event::new(NICK, [candidate])).await {
            debug!(error = %e, "Failed to send alternative nickname");
        }
    }
}

// ============================================================================
// Membership
// ============================================================================

/// Tracks joins. On our own join, also asks for the channel's modes and
/// member details.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let (Some(Source::User { nick, ident, host }), Some(channel)) =
            (&event.source, event.param(0).or(event.trailing.as_deref()))
        else {
            return;
        };
        if !channel.is_channel_name() {
            return;
        }

        let is_me = client.update_state(|state| {
            let is_me = state.is_me(nick);
            if is_me {
                state.add_channel(channel);
            }
            if let Some(user) = state.add_member(channel, nick) {
                user.ident.clone_from(ident);
                user.host.clone_from(host);
            }
            is_me
        });

        if is_me {
            debug!(channel = %channel, "Joined, querying modes and members");
            for query in [Event::new(MODE, [channel]), Event::new(WHO, [channel])] {
                if let Err(e) = client.send(query).await {
                    debug!(error = %e, "Failed to query joined channel");
                }
            }
        }
    }
}

pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let (Some(nick), Some(channel)) = (event.source_nick(), event.param(0)) else {
            return;
        };
        client.update_state(|state| {
            if state.is_me(nick) {
                state.remove_channel(channel);
            } else {
                state.remove_member(channel, nick);
            }
        });
    }
}

pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let Some(nick) = event.source_nick() else {
            return;
        };
        client.update_state(|state| {
            if !state.is_me(nick) {
                state.remove_user(nick);
            }
        });
    }
}

pub struct KickHandler;

#[async_trait]
impl Handler for KickHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let (Some(channel), Some(victim)) = (event.param(0), event.param(1)) else {
            return;
        };
        client.update_state(|state| {
            if state.is_me(victim) {
                info!(channel = %channel, by = ?event.source_nick(), "Kicked");
                state.remove_channel(channel);
            } else {
                state.remove_member(channel, victim);
            }
        });
    }
}

pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let (Some(old), Some(new)) = (event.source_nick(), event.last()) else {
            return;
        };
        client.update_state(|state| {
            if state.is_me(old) {
                state.set_nick(new);
            } else {
                state.rename_user(old, new);
            }
        });
    }
}

/// Fills in ident, host and real name from `RPL_WHOREPLY`.
///
/// `<me> <channel> <ident> <host> <server> <nick> <flags> :<hops> <name>`
pub struct WhoReplyHandler;

#[async_trait]
impl Handler for WhoReplyHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let (Some(ident), Some(host), Some(nick)) =
            (event.param(2), event.param(3), event.param(5))
        else {
            return;
        };
        let name = event
            .trailing
            .as_deref()
            .and_then(|t| t.split_once(' '))
            .map(|(_, name)| name.to_string());

        client.update_state(|state| {
            if let Some(user) = state.user_mut(nick) {
                user.ident = Some(ident.to_string());
                user.host = Some(host.to_string());
                user.name = name;
            }
        });
    }
}

/// Applies member prefixes from `RPL_NAMREPLY`.
///
/// `<me> <type> <channel> :[prefix]<nick> ...`
pub struct NamesHandler;

#[async_trait]
impl Handler for NamesHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let (Some(channel), Some(names)) = (event.param(2), event.trailing.as_deref()) else {
            return;
        };
        client.update_state(|state| {
            let Some(table) = state.channel(channel).map(|c| c.modes.table().clone()) else {
                return;
            };
            for token in names.split_whitespace() {
                let (symbols, nick) = table.split_prefixed(token);
                if !nick.is_empty() {
                    state.apply_member_prefix(channel, nick, symbols);
                }
            }
        });
    }
}

// ============================================================================
// Modes and server options
// ============================================================================

/// Applies channel `MODE` changes. User mode changes are ignored.
pub struct ModeHandler;

#[async_trait]
impl Handler for ModeHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let args = args(event);
        let [target, flags, rest @ ..] = args.as_slice() else {
            return;
        };
        apply_modes(client, target, flags, rest);
    }
}

/// `RPL_CHANNELMODEIS`: `<me> <channel> <flags> [args...]`.
pub struct ChannelModeIsHandler;

#[async_trait]
impl Handler for ChannelModeIsHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        let args = args(event);
        let [_, channel, flags, rest @ ..] = args.as_slice() else {
            return;
        };
        apply_modes(client, channel, flags, rest);
    }
}

fn apply_modes(client: &Client, target: &str, flags: &str, rest: &[&str]) {
    if !target.is_channel_name() {
        return;
    }
    client.update_state(|state| {
        let Some(changes) = state.channel(target).map(|c| c.modes.parse(flags, rest)) else {
            return;
        };
        debug!(channel = %target, flags = %flags, changes = changes.len(), "Applying modes");
        state.apply_channel_modes(target, &changes);
    });
}

/// Records `RPL_ISUPPORT` options.
pub struct IsupportHandler;

#[async_trait]
impl Handler for IsupportHandler {
    async fn handle(&self, client: &Client, event: &Event) {
        client.update_state(|state| state.options_mut().apply_reply(&event.params));
    }
}
