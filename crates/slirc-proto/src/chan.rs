//! Channel name utilities.
//!
//! # Reference
//! - RFC 2812 Section 1.3: Channel names

/// Maximum channel name length, prefix included.
pub const MAX_CHANNEL_LEN: usize = 50;

/// Extension trait for checking if a string is a valid channel name.
pub trait ChannelExt {
    /// Check if this string is a valid channel name.
    ///
    /// - Starts with `#`, `&`, `+`, or `!`
    /// - Has at least one character after the prefix
    /// - Contains no space, comma, BEL, NUL, or other control character
    /// - Is at most [`MAX_CHANNEL_LEN`] characters long
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        let mut chars = self.chars();

        match chars.next() {
            Some('#' | '&' | '+' | '!') => {}
            _ => return false,
        }

        if self.chars().count() > MAX_CHANNEL_LEN || self.len() < 2 {
            return false;
        }

        chars.all(|c| c != ' ' && c != ',' && !c.is_control())
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_channels() {
        assert!("#channel".is_channel_name());
        assert!("&local".is_channel_name());
        assert!("+modeless".is_channel_name());
        assert!("!safe12345".is_channel_name());
        assert!("##rust-offtopic".is_channel_name());
    }

    #[test]
    fn test_invalid_channels() {
        assert!(!"channel".is_channel_name());
        assert!(!"#".is_channel_name());
        assert!(!"#chan nel".is_channel_name());
        assert!(!"#chan,nel".is_channel_name());
        assert!(!"#chan\x07".is_channel_name());
        assert!(!"".is_channel_name());
        assert!(!format!("#{}", "a".repeat(50)).is_channel_name());
    }
}
