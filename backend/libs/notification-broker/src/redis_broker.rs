/// Redis Pub/Sub broker
///
/// Events travel as `PUBLISH <channel> {"event": .., "data": {..}}`. Each subscription
/// opens its own pub/sub connection; closing the subscription drops that connection,
/// which removes it from the Redis fan-out.
use crate::{Broker, BrokerEvent, Payload, Result, Subscription};
use async_trait::async_trait;
use futures_util::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct RedisBroker {
    client: Client,
    connection: ConnectionManager,
}

impl RedisBroker {
    /// Connect to Redis
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client.clone()).await?;

        info!("Connected to Redis broker");
        Ok(Self { client, connection })
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn publish(&self, channel: &str, event: &str, payload: Payload) -> Result<usize> {
        let body = BrokerEvent::to_envelope(event, &payload)?;

        let mut conn = self.connection.clone();
        let subscriber_count: usize = conn.publish(channel, body).await?;

        debug!(
            channel = %channel,
            event = %event,
            subscribers = subscriber_count,
            "Event published"
        );
        Ok(subscriber_count)
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;

        info!(channel = %channel, "Subscribed to Redis channel");

        let (tx, rx) = mpsc::unbounded_channel();
        let channel_name = channel.to_string();

        let pump = tokio::spawn(async move {
            let mut stream = pubsub.on_message();

            while let Some(msg) = stream.next().await {
                let body = match msg.get_payload::<String>() {
                    Ok(body) => body,
                    Err(e) => {
                        error!(error = ?e, channel = %channel_name, "Failed to get message payload");
                        continue;
                    }
                };

                let event = match BrokerEvent::from_envelope(&channel_name, &body) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(error = ?e, body = %body, "Malformed event envelope, skipped");
                        continue;
                    }
                };

                if tx.send(event).is_err() {
                    break;
                }
            }

            debug!(channel = %channel_name, "Redis subscription ended");
        });

        Ok(Subscription::from_receiver(channel, rx).with_transport(pump))
    }
}
