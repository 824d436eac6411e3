/// In-process broker
///
/// Fan-out hub for single-node deployments and tests. Each subscription owns an
/// unbounded queue; publishing pushes a copy of the event onto every live queue of
/// the channel. Queues whose subscription has gone away are pruned on publish.
use crate::{Broker, BrokerError, BrokerEvent, Payload, Result, Subscription};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

type EventSender = mpsc::UnboundedSender<BrokerEvent>;

#[derive(Default)]
struct Hub {
    /// channel -> one sender per subscription
    channels: HashMap<String, Vec<EventSender>>,
    closed: bool,
}

#[derive(Clone, Default)]
pub struct MemoryBroker {
    hub: Arc<RwLock<Hub>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions on `channel`
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        let hub = self.hub.read().await;
        hub.channels
            .get(channel)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    /// Number of channels with at least one registered subscription
    pub async fn channel_count(&self) -> usize {
        let hub = self.hub.read().await;
        hub.channels.len()
    }

    /// Drop every subscription queue and refuse further publish/subscribe calls
    pub async fn shutdown(&self) {
        let mut hub = self.hub.write().await;
        hub.channels.clear();
        hub.closed = true;
        info!("In-process broker shut down");
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn publish(&self, channel: &str, event: &str, payload: Payload) -> Result<usize> {
        let mut hub = self.hub.write().await;
        if hub.closed {
            return Err(BrokerError::Closed(channel.to_string()));
        }

        let Some(senders) = hub.channels.get_mut(channel) else {
            debug!(channel = %channel, event = %event, "No subscribers, event dropped");
            return Ok(0);
        };

        senders.retain(|sender| !sender.is_closed());

        let message = BrokerEvent::new(channel, event, payload);
        let delivered = senders
            .iter()
            .filter(|sender| sender.send(message.clone()).is_ok())
            .count();

        if senders.is_empty() {
            hub.channels.remove(channel);
        }

        debug!(channel = %channel, event = %event, subscribers = delivered, "Event published");
        Ok(delivered)
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription> {
        let mut hub = self.hub.write().await;
        if hub.closed {
            return Err(BrokerError::Closed(channel.to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let senders = hub.channels.entry(channel.to_string()).or_default();
        senders.retain(|sender| !sender.is_closed());
        senders.push(tx);

        debug!(channel = %channel, "Subscribed");
        Ok(Subscription::from_receiver(channel, rx))
    }
}
