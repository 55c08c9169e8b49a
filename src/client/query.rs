//! Request/response over the event stream.
//!
//! A request registers temporary background handlers for the expected
//! replies, sends one event, and waits for a completion reply or a timeout.
//! The handlers are removed on every exit path.

use std::future::ready;
use std::sync::Arc;

use parking_lot::Mutex;
use slirc_proto::command::WHOWAS;
use slirc_proto::response::{RPL_ENDOFWHOWAS, RPL_WHOWASUSER};
use slirc_proto::{Event, NickExt};
use tokio::sync::oneshot;
use tracing::debug;

use super::Client;
use crate::callback::{CallbackId, Registry, handler_fn};
use crate::error::{ClientError, ClientResult};
use crate::session::TrackedUser;

/// Handlers registered for the duration of one request. Dropping the guard
/// removes them.
pub struct TemporaryHandlers<'a> {
    registry: &'a Registry,
    ids: Vec<CallbackId>,
}

impl<'a> TemporaryHandlers<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            ids: Vec::new(),
        }
    }

    pub fn push(&mut self, id: CallbackId) {
        self.ids.push(id);
    }

    pub fn ids(&self) -> &[CallbackId] {
        &self.ids
    }
}

impl Drop for TemporaryHandlers<'_> {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            self.registry.remove(id);
        }
    }
}

impl Client {
    /// Send `request` and collect replies until a completion arrives.
    ///
    /// Events whose command is in `collect` and that satisfy `matches` are
    /// accumulated; the first `complete` event that satisfies `matches`
    /// ends the exchange. Without one inside the configured request timeout
    /// the call fails with [`ClientError::Timeout`].
    pub async fn request<P>(
        &self,
        request: Event,
        collect: &[&str],
        complete: &str,
        matches: P,
    ) -> ClientResult<Vec<Event>>
    where
        P: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        let matches = Arc::new(matches);
        let results = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done_rx) = oneshot::channel::<()>();
        let done_tx = Arc::new(Mutex::new(Some(done_tx)));

        let mut handlers = TemporaryHandlers::new(self.registry());
        for command in collect {
            let (matches, results) = (matches.clone(), results.clone());
            handlers.push(self.add_background_handler(
                command,
                handler_fn(move |_, event| {
                    if matches(&event) {
                        results.lock().push(event);
                    }
                    ready(())
                }),
            ));
        }
        let done_matches = matches.clone();
        handlers.push(self.add_background_handler(
            complete,
            handler_fn(move |_, event| {
                if done_matches(&event) {
                    if let Some(tx) = done_tx.lock().take() {
                        let _ = tx.send(());
                    }
                }
                ready(())
            }),
        ));

        self.send(request).await?;

        let timeout = self.config().timeouts.request();
        match tokio::time::timeout(timeout, done_rx).await {
            Ok(Ok(())) => {
                drop(handlers);
                Ok(std::mem::take(&mut *results.lock()))
            }
            _ => {
                let ids = handlers.ids().to_vec();
                debug!(?ids, "Request timed out");
                Err(ClientError::Timeout { ids, timeout })
            }
        }
    }

    /// Ask the server about a nickname that is no longer in use.
    pub async fn whowas(&self, nick: &str) -> ClientResult<Vec<TrackedUser>> {
        if !nick.is_valid_nick() {
            return Err(ClientError::InvalidTarget(nick.to_string()));
        }

        let target = nick.to_string();
        let is_for_target = move |event: &Event| {
            let about_target = event
                .param(1)
                .is_some_and(|n| n.eq_ignore_ascii_case(&target));
            match event.command.as_str() {
                RPL_WHOWASUSER => about_target && event.params.len() >= 5,
                _ => about_target,
            }
        };

        let replies = self
            .request(
                Event::new(WHOWAS, [nick, "10"]),
                &[RPL_WHOWASUSER],
                RPL_ENDOFWHOWAS,
                is_for_target,
            )
            .await?;

        // `<me> <nick> <ident> <host> * :<real name>`
        Ok(replies
            .into_iter()
            .map(|reply| TrackedUser {
                nick: reply.param(1).unwrap_or_default().to_string(),
                ident: reply.param(2).map(str::to_string),
                host: reply.param(3).map(str::to_string),
                name: reply.trailing.clone(),
                ..Default::default()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_request_offline_leaves_no_handlers() {
        let client = Client::new(Config::new("irc.example.net", 6667, "tester"));
        let before = client.registry().count();

        let result = client
            .request(Event::new("LUSERS", Vec::<String>::new()), &["251"], "255", |_| true)
            .await;
        assert!(matches!(result, Err(ClientError::NotConnected)));
        assert_eq!(client.registry().count(), before);
    }

    #[tokio::test]
    async fn test_whowas_rejects_bad_nick() {
        let client = Client::new(Config::new("irc.example.net", 6667, "tester"));
        assert!(matches!(
            client.whowas("#chan").await,
            Err(ClientError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_guard_removes_on_drop() {
        let registry = Registry::new();
        {
            let mut guard = TemporaryHandlers::new(&registry);
            guard.push(registry.add_background("314", handler_fn(|_, _| ready(()))));
            assert_eq!(registry.count(), 1);
        }
        assert_eq!(registry.count(), 0);
    }
}
