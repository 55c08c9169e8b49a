//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - `types`: Config struct definitions and TOML loading
//! - `validation`: Checks run before every connection attempt
//! - `defaults`: serde default functions

mod defaults;
mod types;
mod validation;

pub use types::{
    Config, ConfigError, FeaturesConfig, IdentityConfig, ReconnectConfig, ServerConfig,
    TimeoutsConfig, TlsConfig,
};
pub use validation::{VALID_PORTS, ValidationError, validate};
