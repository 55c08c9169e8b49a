//! Command tokens the client sends or tracks.

pub const ACTION: &str = "ACTION";
pub const ERROR: &str = "ERROR";
pub const JOIN: &str = "JOIN";
pub const KICK: &str = "KICK";
pub const MODE: &str = "MODE";
pub const NICK: &str = "NICK";
pub const NOTICE: &str = "NOTICE";
pub const PART: &str = "PART";
pub const PASS: &str = "PASS";
pub const PING: &str = "PING";
pub const PONG: &str = "PONG";
pub const PRIVMSG: &str = "PRIVMSG";
pub const QUIT: &str = "QUIT";
pub const TOPIC: &str = "TOPIC";
pub const USER: &str = "USER";
pub const WHO: &str = "WHO";
pub const WHOWAS: &str = "WHOWAS";
