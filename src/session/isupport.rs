//! Server-advertised options (`RPL_ISUPPORT`).

use std::collections::HashMap;

/// Key/value options collected from one or more `005` replies.
///
/// Bare keys (`EXCEPTS`) are stored with an empty value. A `-KEY` token
/// withdraws a previously advertised option.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerOptions {
    entries: HashMap<String, String>,
}

impl ServerOptions {
    /// Apply the arguments of an `RPL_ISUPPORT` reply.
    ///
    /// The first argument (our nickname) is skipped, and so is a final
    /// human-readable argument such as `are supported by this server`.
    pub fn apply_reply<S: AsRef<str>>(&mut self, args: &[S]) {
        let Some((_, mut tokens)) = args.split_first() else {
            return;
        };
        if tokens.last().is_some_and(|t| t.as_ref().contains(' ')) {
            tokens = &tokens[..tokens.len() - 1];
        }
        for token in tokens {
            self.apply_token(token.as_ref());
        }
    }

    /// Apply a single `KEY`, `KEY=value` or `-KEY` token.
    pub fn apply_token(&mut self, token: &str) {
        if let Some(key) = token.strip_prefix('-') {
            if !key.is_empty() {
                self.entries.remove(key);
            }
            return;
        }

        let (key, value) = token.split_once('=').unwrap_or((token, ""));
        if key.is_empty() {
            return;
        }
        self.entries.insert(key.to_string(), value.to_string());
    }

    /// Look up an option. Bare keys return `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether any option with this key was advertised.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_reply_skips_nick_and_text() {
        let mut opts = ServerOptions::default();
        opts.apply_reply(&[
            "me",
            "NETWORK=TestNet",
            "EXCEPTS",
            "PREFIX=(ov)@+",
            "are supported by this server",
        ]);
        assert_eq!(opts.get("NETWORK"), Some("TestNet"));
        assert_eq!(opts.get("EXCEPTS"), Some(""));
        assert_eq!(opts.get("PREFIX"), Some("(ov)@+"));
        assert!(!opts.contains("me"));
        assert_eq!(opts.len(), 3);
    }

    #[test]
    fn test_negation_removes_key() {
        let mut opts = ServerOptions::default();
        opts.apply_token("SILENCE=15");
        opts.apply_token("-SILENCE");
        assert_eq!(opts.get("SILENCE"), None);
        opts.apply_token("-");
        opts.apply_token("=oops");
        assert!(opts.is_empty());
    }

    #[test]
    fn test_later_value_wins() {
        let mut opts = ServerOptions::default();
        opts.apply_token("CHANMODES=b,k,l,n");
        opts.apply_token("CHANMODES=beI,k,l,imnpst");
        assert_eq!(opts.get("CHANMODES"), Some("beI,k,l,imnpst"));
    }
}
