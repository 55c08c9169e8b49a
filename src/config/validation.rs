//! Configuration validation.
//!
//! Run before every connection attempt so that bad input fails fast without
//! touching the network.

use super::Config;
use slirc_proto::{ChannelExt, NickExt};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Ports a client may connect to.
pub const VALID_PORTS: RangeInclusive<u16> = 21..=65535;

/// Validation errors for configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.host is required")]
    EmptyHost,
    #[error("server.port must be in 21..=65535, got {0}")]
    InvalidPort(u16),
    #[error("identity.nick is not a valid nickname: {0:?}")]
    InvalidNick(String),
    #[error("identity.user is not a valid username: {0:?}")]
    InvalidUser(String),
    #[error("channels entry is not a valid channel name: {0:?}")]
    InvalidChannel(String),
    #[error("timeouts.{0} must be at least 1")]
    ZeroTimeout(&'static str),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if !VALID_PORTS.contains(&config.server.port) {
        errors.push(ValidationError::InvalidPort(config.server.port));
    }

    let identity = &config.identity;
    if !identity.nick.is_valid_nick() {
        errors.push(ValidationError::InvalidNick(identity.nick.clone()));
    }
    if !identity.user.is_valid_user() {
        errors.push(ValidationError::InvalidUser(identity.user.clone()));
    }

    for channel in &config.channels {
        if !channel.is_channel_name() {
            errors.push(ValidationError::InvalidChannel(channel.clone()));
        }
    }

    let timeouts = &config.timeouts;
    if timeouts.read_idle_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("read_idle_secs"));
    }
    if timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config::new("irc.example.net", 6667, "slirc")
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid()).is_ok());
    }

    #[test]
    fn test_empty_host_fails() {
        let mut config = valid();
        config.server.host = "  ".into();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyHost]);
    }

    #[test]
    fn test_port_range() {
        let mut config = valid();
        config.server.port = 20;
        assert!(validate(&config).is_err());
        config.server.port = 21;
        assert!(validate(&config).is_ok());
        config.server.port = 0;
        let errors = validate(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidPort(0)));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.identity.nick = "9lives".into();
        config.identity.user = "".into();
        config.channels = vec!["#ok".into(), "nope".into()];
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::InvalidChannel("nope".into())));
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = valid();
        config.timeouts.read_idle_secs = 0;
        config.timeouts.request_secs = 0;
        let errors = validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroTimeout("read_idle_secs"),
                ValidationError::ZeroTimeout("request_secs"),
            ]
        );
    }
}
