//! Handler trait and closure adapter.

use std::future::Future;

use async_trait::async_trait;
use slirc_proto::Event;

use crate::client::Client;

/// Something that reacts to inbound events.
///
/// Handlers observe the event and may mutate session state or send through
/// the client. They return nothing; a panic is caught by the dispatcher and
/// logged, and the remaining handlers still run.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, client: &Client, event: &Event);
}

/// Handler backed by a closure. See [`handler_fn`].
pub struct FnHandler<F>(F);

/// Wrap a closure as a [`Handler`].
///
/// The closure gets owned copies of the client handle and the event so the
/// returned future can be `'static`.
///
/// ```
/// use slirc_client::callback::handler_fn;
///
/// let greeter = handler_fn(|client, event| async move {
///     if let Some(nick) = event.source_nick() {
///         let _ = client.message(nick, "hello").await;
///     }
/// });
/// # let _ = greeter;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Client, Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Client, Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, client: &Client, event: &Event) {
        (self.0)(client.clone(), event.clone()).await
    }
}
