use crate::{BrokerEvent, Payload};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Event callback bound on a subscription
pub type Handler = Box<dyn Fn(&Payload) + Send + Sync + 'static>;

/// Event name -> handlers, in bind order. `None` once unsubscribed.
type HandlerTable = Arc<Mutex<Option<HashMap<String, Vec<Handler>>>>>;

/// Handle to one channel subscription
///
/// Events are dispatched one at a time, in receipt order, on a dedicated task.
/// The handler table lock is held for the whole invocation, so `unbind_all` and
/// `unsubscribe_all` wait for an in-flight handler to return and no handler can
/// start after they return.
pub struct Subscription {
    channel: String,
    handlers: HandlerTable,
    tasks: Vec<JoinHandle<()>>,
}

impl Subscription {
    /// Start dispatching events read from `events`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn from_receiver(
        channel: impl Into<String>,
        events: mpsc::UnboundedReceiver<BrokerEvent>,
    ) -> Self {
        let channel = channel.into();
        let handlers: HandlerTable = Arc::new(Mutex::new(Some(HashMap::new())));
        let dispatch = spawn_dispatch(channel.clone(), events, Arc::clone(&handlers));

        Self {
            channel,
            handlers,
            tasks: vec![dispatch],
        }
    }

    /// Attach a transport task whose lifetime is tied to this subscription
    pub fn with_transport(mut self, task: JoinHandle<()>) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Whether `unsubscribe_all` has not been called yet
    pub fn is_active(&self) -> bool {
        lock(&self.handlers).is_some()
    }

    /// Register `handler` for `event`.
    ///
    /// Ignored after `unsubscribe_all`.
    ///
    /// Handlers run with the handler table locked. A handler must not call `bind`,
    /// `unbind_all` or `unsubscribe_all` on its own subscription, or the dispatch
    /// task deadlocks. Forward the request to another task instead.
    pub fn bind<F>(&self, event: impl Into<String>, handler: F)
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        let event = event.into();
        match lock(&self.handlers).as_mut() {
            Some(table) => {
                debug!(channel = %self.channel, event = %event, "Handler bound");
                table.entry(event).or_default().push(Box::new(handler));
            }
            None => {
                debug!(channel = %self.channel, event = %event, "Bind on closed subscription ignored");
            }
        }
    }

    /// Remove every bound handler. Events keep arriving but are dropped.
    pub fn unbind_all(&self) {
        if let Some(table) = lock(&self.handlers).as_mut() {
            table.clear();
        }
    }

    /// Stop delivery and leave the channel. Idempotent.
    pub fn unsubscribe_all(&mut self) {
        let was_active = lock(&self.handlers).take().is_some();

        for task in self.tasks.drain(..) {
            task.abort();
        }

        if was_active {
            debug!(channel = %self.channel, "Unsubscribed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("active", &self.is_active())
            .finish()
    }
}

// A handler that panicked poisons the table; the table itself is still consistent.
fn lock(handlers: &HandlerTable) -> MutexGuard<'_, Option<HashMap<String, Vec<Handler>>>> {
    handlers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn spawn_dispatch(
    channel: String,
    mut events: mpsc::UnboundedReceiver<BrokerEvent>,
    handlers: HandlerTable,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let guard = lock(&handlers);
            let Some(table) = guard.as_ref() else {
                break;
            };

            match table.get(&event.event) {
                Some(bound) => {
                    for handler in bound {
                        handler(&event.data);
                    }
                }
                None => {
                    trace!(channel = %channel, event = %event.event, "No handler bound, event dropped");
                }
            }
        }

        debug!(channel = %channel, "Subscription dispatch ended");
    })
}
