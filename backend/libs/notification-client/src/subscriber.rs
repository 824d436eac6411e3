/// Client subscriber
///
/// Keeps one subscription to the global notification channel and turns each
/// `new-notification` event into a `Command::Append` for the session. It holds no
/// notification data itself.
use crate::error::{ClientError, Result};
use crate::notification::Notification;
use crate::session::{Command, CommandSender};
use notification_broker::{Broker, Subscription, NEW_NOTIFICATION_EVENT, NOTIFICATION_CHANNEL};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    Disconnected,
    Connecting,
    Connected,
}

pub struct ClientSubscriber {
    state: SubscriberState,
    broker: Option<Arc<dyn Broker>>,
    subscription: Option<Subscription>,
    commands: Option<CommandSender>,
}

impl ClientSubscriber {
    pub fn new(broker: Arc<dyn Broker>, commands: CommandSender) -> Self {
        Self {
            state: SubscriberState::Disconnected,
            broker: Some(broker),
            subscription: None,
            commands: Some(commands),
        }
    }

    pub fn state(&self) -> SubscriberState {
        self.state
    }

    /// Subscribe to the notification channel and bind the event handler.
    ///
    /// No-op when already connected. On failure the subscriber is back in
    /// `Disconnected` and may retry.
    pub async fn connect(&mut self) -> Result<()> {
        if self.state == SubscriberState::Connected {
            return Ok(());
        }

        let (Some(broker), Some(commands)) = (self.broker.clone(), self.commands.clone()) else {
            return Err(ClientError::ConnectionReleased);
        };

        self.state = SubscriberState::Connecting;
        let subscription = match broker.subscribe(NOTIFICATION_CHANNEL).await {
            Ok(subscription) => subscription,
            Err(e) => {
                self.state = SubscriberState::Disconnected;
                warn!(error = %e, channel = NOTIFICATION_CHANNEL, "Subscribe failed");
                return Err(e.into());
            }
        };

        subscription.bind(NEW_NOTIFICATION_EVENT, move |payload| {
            let notification = Notification::from_payload(payload);
            if commands.send(Command::Append(notification)).is_err() {
                debug!("Session gone, event dropped");
            }
        });

        info!(channel = subscription.channel(), "Notification subscriber connected");
        self.subscription = Some(subscription);
        self.state = SubscriberState::Connected;
        Ok(())
    }

    /// Unbind handlers, unsubscribe and release the broker connection, in that order.
    ///
    /// Safe to call repeatedly and before any `connect`.
    pub fn teardown(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unbind_all();
            subscription.unsubscribe_all();
        }

        let released = self.broker.take().is_some();
        self.commands = None;
        self.state = SubscriberState::Disconnected;

        if released {
            debug!("Notification subscriber torn down");
        }
    }
}

impl Drop for ClientSubscriber {
    fn drop(&mut self) {
        self.teardown();
    }
}
