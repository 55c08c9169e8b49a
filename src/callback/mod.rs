//! Callback registry, the [`Handler`] trait and the built-in handlers.

pub(crate) mod builtin;
mod handler;
mod registry;

pub use self::handler::{FnHandler, Handler, handler_fn};
pub use self::registry::{CallbackId, Registry, WILDCARD};
