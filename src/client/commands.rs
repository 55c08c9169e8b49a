//! Outbound commands.
//!
//! Every target is checked against the nickname/channel grammar before
//! anything is written, so malformed input never reaches the wire.

use slirc_proto::command::{ACTION, JOIN, MODE, NICK, NOTICE, PART, PRIVMSG, TOPIC, WHO};
use slirc_proto::{ChannelExt, Event, NickExt};

use super::Client;
use crate::error::{ClientError, ClientResult};

fn check_channel(channel: &str) -> ClientResult {
    if channel.is_channel_name() {
        Ok(())
    } else {
        Err(ClientError::InvalidTarget(channel.to_string()))
    }
}

fn check_nick(nick: &str) -> ClientResult {
    if nick.is_valid_nick() {
        Ok(())
    } else {
        Err(ClientError::InvalidTarget(nick.to_string()))
    }
}

/// A message target: a channel or a nickname.
fn check_target(target: &str) -> ClientResult {
    if target.is_channel_name() || target.is_valid_nick() {
        Ok(())
    } else {
        Err(ClientError::InvalidTarget(target.to_string()))
    }
}

impl Client {
    /// Ask the server to change our nickname. Session state follows once
    /// the server confirms.
    pub async fn set_nickname(&self, nick: &str) -> ClientResult {
        check_nick(nick)?;
        self.send(Event::new(NICK, [nick])).await
    }

    pub async fn join(&self, channel: &str) -> ClientResult {
        check_channel(channel)?;
        self.send(Event::new(JOIN, [channel])).await
    }

    /// Join a channel protected by a key (`+k`).
    pub async fn join_with_key(&self, channel: &str, key: &str) -> ClientResult {
        check_channel(channel)?;
        self.send(Event::new(JOIN, [channel, key])).await
    }

    pub async fn part(&self, channel: &str, message: Option<&str>) -> ClientResult {
        check_channel(channel)?;
        let mut event = Event::new(PART, [channel]);
        if let Some(message) = message {
            event = event.with_trailing(message);
        }
        self.send(event).await
    }

    pub async fn message(&self, target: &str, text: &str) -> ClientResult {
        check_target(target)?;
        self.send(Event::new(PRIVMSG, [target]).with_trailing(text))
            .await
    }

    pub async fn notice(&self, target: &str, text: &str) -> ClientResult {
        check_target(target)?;
        self.send(Event::new(NOTICE, [target]).with_trailing(text))
            .await
    }

    /// CTCP `ACTION` (`/me`).
    pub async fn action(&self, target: &str, text: &str) -> ClientResult {
        check_target(target)?;
        let body = format!("\x01{ACTION} {text}\x01");
        self.send(Event::new(PRIVMSG, [target]).with_trailing(body))
            .await
    }

    /// Set a channel topic.
    pub async fn topic(&self, channel: &str, text: &str) -> ClientResult {
        check_channel(channel)?;
        self.send(Event::new(TOPIC, [channel]).with_trailing(text))
            .await
    }

    /// `WHO` a channel or nickname.
    pub async fn who(&self, target: &str) -> ClientResult {
        check_target(target)?;
        self.send(Event::new(WHO, [target])).await
    }

    /// Query (`flags` empty) or change modes, e.g. `mode("#rust", "+o alice")`.
    pub async fn mode(&self, target: &str, flags: &str) -> ClientResult {
        check_target(target)?;
        let params = std::iter::once(target).chain(flags.split_whitespace());
        self.send(Event::new(MODE, params)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn offline() -> Client {
        Client::new(Config::new("irc.example.net", 6667, "tester"))
    }

    #[tokio::test]
    async fn test_invalid_target_checked_before_connection() {
        let client = offline();
        assert!(matches!(
            client.join("rust").await,
            Err(ClientError::InvalidTarget(t)) if t == "rust"
        ));
        assert!(matches!(
            client.message("bad nick", "hi").await,
            Err(ClientError::InvalidTarget(_))
        ));
        assert!(matches!(
            client.set_nickname("1abc").await,
            Err(ClientError::InvalidTarget(_))
        ));
        assert!(matches!(
            client.topic("alice", "x").await,
            Err(ClientError::InvalidTarget(_))
        ));
    }

    #[tokio::test]
    async fn test_valid_target_needs_connection() {
        let client = offline();
        assert!(matches!(
            client.join("#rust").await,
            Err(ClientError::NotConnected)
        ));
        assert!(matches!(
            client.action("alice", "waves").await,
            Err(ClientError::NotConnected)
        ));
        assert!(matches!(
            client.send_raw("PRIVMSG #rust :hi").await,
            Err(ClientError::NotConnected)
        ));
        assert!(matches!(
            client.send_raw("   ").await,
            Err(ClientError::InvalidEvent(_))
        ));
    }
}
