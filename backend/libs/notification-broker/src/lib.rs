//! Channel-based Pub/Sub broker for real-time notifications
//!
//! Producers publish named events on a channel; every current subscriber of that
//! channel receives the event once, best-effort, with no acknowledgment and no retry.
//!
//! # Architecture
//!
//! ```text
//! notification-service:
//!   1. Persist the notification
//!   2. broker.publish("notification-channel", "new-notification", {"title": .., "message": ..})
//!      ↓
//! Broker (in-process hub or Redis Pub/Sub, fan-out to all subscribers)
//!      ↓
//! notification-client:
//!   3. subscription.bind("new-notification", handler)
//!   4. handler turns the payload into a store command
//! ```
//!
//! # Example
//!
//! ```no_run
//! use notification_broker::{Broker, MemoryBroker, Payload, NEW_NOTIFICATION_EVENT, NOTIFICATION_CHANNEL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), notification_broker::BrokerError> {
//!     let broker = MemoryBroker::new();
//!
//!     let subscription = broker.subscribe(NOTIFICATION_CHANNEL).await?;
//!     subscription.bind(NEW_NOTIFICATION_EVENT, |payload| {
//!         println!("received: {:?}", payload);
//!     });
//!
//!     let mut payload = Payload::new();
//!     payload.insert("title".into(), "Hi".into());
//!     broker.publish(NOTIFICATION_CHANNEL, NEW_NOTIFICATION_EVENT, payload).await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

mod error;
mod event;
mod memory;
mod redis_broker;
mod subscription;

pub use error::BrokerError;
pub use event::{BrokerEvent, Payload};
pub use memory::MemoryBroker;
pub use redis_broker::RedisBroker;
pub use subscription::{Handler, Subscription};

pub type Result<T> = std::result::Result<T, BrokerError>;

/// Globally-known channel every notification is broadcast on
pub const NOTIFICATION_CHANNEL: &str = "notification-channel";

/// Event name carrying a newly created notification
pub const NEW_NOTIFICATION_EVENT: &str = "new-notification";

/// Publish/subscribe transport
///
/// Delivery is at-most-once. Ordering is only preserved for events published through
/// the same broker handle; nothing is promised across independent publishers.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Hand `payload` to every current subscriber of `channel` as event `event`.
    ///
    /// Returns the number of subscribers the event was handed to. Zero subscribers
    /// is not an error.
    async fn publish(&self, channel: &str, event: &str, payload: Payload) -> Result<usize>;

    /// Join the fan-out of `channel`.
    ///
    /// The returned handle receives every event published after this call returns.
    async fn subscribe(&self, channel: &str) -> Result<Subscription>;
}
