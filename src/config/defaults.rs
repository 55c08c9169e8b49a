//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_port() -> u16 {
    6667
}

// =============================================================================
// Reconnect Defaults
// =============================================================================

pub fn default_max_retries() -> u32 {
    3
}

/// Also the floor: configured delays below this are raised to it.
pub fn default_reconnect_delay() -> u64 {
    10
}

/// Upper bound for a single backoff wait.
pub fn default_max_backoff() -> u64 {
    300
}

// =============================================================================
// Timeout Defaults
// =============================================================================

pub fn default_read_idle() -> u64 {
    300
}

pub fn default_request_timeout() -> u64 {
    2
}

// =============================================================================
// Dispatch Defaults
// =============================================================================

/// Capacity of the inbound event queue.
pub fn default_queue_capacity() -> usize {
    100
}
