//! Callback registry and dispatch.
//!
//! The `Registry` maps command names to an ordered list of handlers. It is
//! shared between the dispatch loop and callers that add or remove handlers
//! at any time, so entries live behind a lock and dispatch works from a
//! snapshot taken before any handler runs.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use parking_lot::RwLock;
use slirc_proto::Event;
use tracing::{debug, warn};
use uuid::Uuid;

use super::handler::Handler;
use crate::client::Client;

/// Command tag that matches every event.
pub const WILDCARD: &str = "*";

/// Identifier returned on registration, used to remove a handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallbackId(Uuid);

impl CallbackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CallbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct CallbackEntry {
    id: CallbackId,
    command: String,
    handler: Arc<dyn Handler>,
    background: bool,
}

/// Registry of event handlers.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<Vec<CallbackEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a permanent handler for `command` (or [`WILDCARD`]).
    pub fn add(&self, command: &str, handler: impl Handler + 'static) -> CallbackId {
        self.register(command, Arc::new(handler), false)
    }

    /// Register a background handler, meant to be removed again by id.
    pub fn add_background(&self, command: &str, handler: impl Handler + 'static) -> CallbackId {
        self.register(command, Arc::new(handler), true)
    }

    /// Register a shared handler.
    pub fn register(&self, command: &str, handler: Arc<dyn Handler>, background: bool) -> CallbackId {
        let id = CallbackId::new();
        let command = command.to_ascii_uppercase();
        debug!(%id, command = %command, background, "Handler registered");
        self.entries.write().push(CallbackEntry {
            id,
            command,
            handler,
            background,
        });
        id
    }

    /// Remove one handler. Returns whether it was registered.
    ///
    /// A handler that is already running finishes normally.
    pub fn remove(&self, id: CallbackId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        before != entries.len()
    }

    /// Remove every background handler.
    pub fn clear_background(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| !e.background);
        before - entries.len()
    }

    pub fn contains(&self, id: CallbackId) -> bool {
        self.entries.read().iter().any(|e| e.id == id)
    }

    /// Total number of registered handlers.
    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    /// Number of handlers that would see an event with this command,
    /// wildcard handlers included.
    pub fn count_for(&self, command: &str) -> usize {
        self.entries
            .read()
            .iter()
            .filter(|e| matches(&e.command, command))
            .count()
    }

    fn snapshot(&self, command: &str) -> Vec<(CallbackId, Arc<dyn Handler>)> {
        self.entries
            .read()
            .iter()
            .filter(|e| matches(&e.command, command))
            .map(|e| (e.id, Arc::clone(&e.handler)))
            .collect()
    }

    /// Invoke, in registration order, every handler for the event's command
    /// plus every wildcard handler.
    ///
    /// Handlers removed before their turn are skipped. A panicking handler is
    /// logged and does not stop the others.
    pub async fn dispatch(&self, client: &Client, event: &Event) {
        for (id, handler) in self.snapshot(&event.command) {
            if !self.contains(id) {
                continue;
            }
            let outcome = AssertUnwindSafe(handler.handle(client, event))
                .catch_unwind()
                .await;
            if let Err(panic) = outcome {
                warn!(
                    %id,
                    command = %event.command,
                    panic = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
            }
        }
    }
}

fn matches(registered: &str, command: &str) -> bool {
    registered == WILDCARD || registered.eq_ignore_ascii_case(command)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic>")
}
