//! Nickname and username validation.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format (nickname definition)

/// Extension trait for checking protocol grammar of identity strings.
pub trait NickExt {
    /// Check if this string is a valid nickname per RFC 2812.
    ///
    /// - First character: letter (a-z, A-Z) or special character `[\]^_`{|}`
    /// - Subsequent characters: letter, digit (0-9), special, or hyphen (-)
    /// - Maximum length: [`DEFAULT_NICK_MAX_LEN`]
    ///
    /// ```
    /// use slirc_proto::NickExt;
    ///
    /// assert!("nick".is_valid_nick());
    /// assert!("[cool]".is_valid_nick());
    /// assert!(!"123nick".is_valid_nick());
    /// assert!(!"nick name".is_valid_nick());
    /// ```
    fn is_valid_nick(&self) -> bool;

    /// Check if this string is a valid username (ident).
    ///
    /// A single leading `~` (no ident response) is tolerated. The first
    /// remaining character must be alphanumeric; the rest may also be
    /// specials, `-`, `.` or `_`.
    ///
    /// ```
    /// use slirc_proto::NickExt;
    ///
    /// assert!("bot".is_valid_user());
    /// assert!("~bot.v2".is_valid_user());
    /// assert!(!"~".is_valid_user());
    /// assert!(!"-bot".is_valid_user());
    /// ```
    fn is_valid_user(&self) -> bool;
}

/// Default maximum nickname length.
pub const DEFAULT_NICK_MAX_LEN: usize = 30;

/// `[ ] \ ` ^ _ { | }`
#[inline]
fn is_special(c: char) -> bool {
    matches!(c, '[' | ']' | '\\' | '`' | '_' | '^' | '{' | '|' | '}')
}

impl NickExt for str {
    fn is_valid_nick(&self) -> bool {
        if self.is_empty() || self.len() > DEFAULT_NICK_MAX_LEN {
            return false;
        }

        let mut chars = self.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if !first.is_ascii_alphabetic() && !is_special(first) {
            return false;
        }

        chars.all(|c| c.is_ascii_alphanumeric() || is_special(c) || c == '-')
    }

    fn is_valid_user(&self) -> bool {
        let name = self.strip_prefix('~').unwrap_or(self);

        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if !first.is_ascii_alphanumeric() {
            return false;
        }

        chars.all(|c| c.is_ascii_alphanumeric() || is_special(c) || c == '-' || c == '.')
    }
}

impl NickExt for String {
    fn is_valid_nick(&self) -> bool {
        self.as_str().is_valid_nick()
    }

    fn is_valid_user(&self) -> bool {
        self.as_str().is_valid_user()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_nicks() {
        assert!("nick".is_valid_nick());
        assert!("nick123".is_valid_nick());
        assert!("nick-name".is_valid_nick());
        assert!("[nick]".is_valid_nick());
        assert!("nick\\test".is_valid_nick());
        assert!("_nick_".is_valid_nick());
        assert!("`nick`".is_valid_nick());
    }

    #[test]
    fn test_invalid_nicks() {
        assert!(!"".is_valid_nick());
        assert!(!"123nick".is_valid_nick());
        assert!(!"-nick".is_valid_nick());
        assert!(!"nick@host".is_valid_nick());
        assert!(!"nick!user".is_valid_nick());
        assert!(!"#chan".is_valid_nick());
    }

    #[test]
    fn test_nick_length_limit() {
        assert!("a".repeat(30).is_valid_nick());
        assert!(!"a".repeat(31).is_valid_nick());
    }

    #[test]
    fn test_users() {
        assert!("user".is_valid_user());
        assert!("9user".is_valid_user());
        assert!("~user".is_valid_user());
        assert!("us.er_x-y".is_valid_user());
        assert!(!"".is_valid_user());
        assert!(!"~".is_valid_user());
        assert!(!"~~user".is_valid_user());
        assert!(!"us er".is_valid_user());
        assert!(!"user@host".is_valid_user());
    }
}
