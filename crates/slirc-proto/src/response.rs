//! Numeric replies the client consumes.
//!
//! Numerics travel as three-digit command tokens, so they are plain string
//! constants comparable against [`Event::command`](crate::Event::command).

pub const RPL_WELCOME: &str = "001";
pub const RPL_YOURHOST: &str = "002";
pub const RPL_CREATED: &str = "003";
pub const RPL_MYINFO: &str = "004";
pub const RPL_ISUPPORT: &str = "005";
pub const RPL_CHANNELMODEIS: &str = "324";
pub const RPL_WHOWASUSER: &str = "314";
pub const RPL_ENDOFWHO: &str = "315";
pub const RPL_ENDOFWHOWAS: &str = "369";
pub const RPL_TOPIC: &str = "332";
pub const RPL_WHOREPLY: &str = "352";
pub const RPL_NAMREPLY: &str = "353";
pub const RPL_ENDOFNAMES: &str = "366";
pub const RPL_ENDOFMOTD: &str = "376";
pub const ERR_NOMOTD: &str = "422";
pub const ERR_WASNOSUCHNICK: &str = "406";
pub const ERR_ERRONEUSNICKNAME: &str = "432";
pub const ERR_NICKNAMEINUSE: &str = "433";
pub const ERR_NICKCOLLISION: &str = "436";
pub const ERR_UNAVAILRESOURCE: &str = "437";

/// Whether a command token is a numeric reply.
pub fn is_numeric(command: &str) -> bool {
    command.len() == 3 && command.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a numeric is in the error range (400-599).
pub fn is_error(command: &str) -> bool {
    is_numeric(command) && matches!(command.as_bytes()[0], b'4' | b'5')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_classification() {
        assert!(is_numeric(RPL_WELCOME));
        assert!(!is_numeric("PRIVMSG"));
        assert!(is_error(ERR_NICKNAMEINUSE));
        assert!(!is_error(RPL_NAMREPLY));
    }
}
