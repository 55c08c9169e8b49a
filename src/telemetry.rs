//! Telemetry utilities for dispatch timing and span construction.

use std::time::{Duration, Instant};

/// Dispatch time above which a warning is logged.
pub const SLOW_DISPATCH: Duration = Duration::from_millis(500);

/// Guard for timing the dispatch of one event.
///
/// Logs the elapsed time when dropped, at `warn` when it exceeded
/// [`SLOW_DISPATCH`] and at `trace` otherwise.
pub struct DispatchTimer {
    command: String,
    start: Instant,
}

impl DispatchTimer {
    /// Start timing a dispatch.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for DispatchTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if elapsed > SLOW_DISPATCH {
            tracing::warn!(
                command = %self.command,
                elapsed_ms = elapsed.as_millis() as u64,
                "Slow dispatch"
            );
        } else {
            tracing::trace!(command = %self.command, elapsed_us = elapsed.as_micros() as u64);
        }
    }
}

/// Standardized span constructors for client observability.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Create a span for one connection to a server.
    pub fn connection(server: &str, nick: &str) -> Span {
        info_span!("connection", server = %server, nick = %nick)
    }

    /// Create a span for dispatching one inbound event.
    pub fn dispatch(command: &str, source: Option<&str>) -> Span {
        if let Some(source) = source {
            debug_span!("dispatch", command = %command, source = %source)
        } else {
            debug_span!("dispatch", command = %command)
        }
    }
}
