/// Client notification system
///
/// Wires a session, a subscriber and the send API together and exposes the three
/// user actions of the notification panel.
use crate::api::{NotificationApi, SendRequest};
use crate::error::Result;
use crate::session::{NotificationSession, SessionHandle};
use crate::store::Projection;
use crate::subscriber::{ClientSubscriber, SubscriberState};
use notification_broker::Broker;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

pub struct NotificationSystem {
    session: SessionHandle,
    session_task: JoinHandle<()>,
    subscriber: ClientSubscriber,
    api: Option<NotificationApi>,
}

impl NotificationSystem {
    /// Start a session and connect the subscriber.
    ///
    /// `api` may be `None` for receive-only clients.
    pub async fn start(broker: Arc<dyn Broker>, api: Option<NotificationApi>) -> Result<Self> {
        let (session, session_task) = NotificationSession::spawn();
        let mut subscriber = ClientSubscriber::new(broker, session.commands());

        if let Err(e) = subscriber.connect().await {
            session_task.abort();
            return Err(e);
        }

        Ok(Self {
            session,
            session_task,
            subscriber,
            api,
        })
    }

    /// Ask the service for the next numbered notification.
    ///
    /// Failures are logged only; the local state is changed by the broadcast, not by
    /// this call.
    pub async fn send_notification(&self) {
        let Some(api) = &self.api else {
            warn!("No notification API configured, send skipped");
            return;
        };

        let next = self.session.projection().items.len() + 1;
        if let Err(e) = api.send(&SendRequest::numbered(next)).await {
            error!(error = %e, "Error sending notification");
        }
    }

    pub fn mark_all_as_read(&self) -> Result<()> {
        self.session.mark_all_read()
    }

    pub fn toggle_notifications(&self) -> Result<()> {
        self.session.toggle_visibility()
    }

    pub fn projection(&self) -> Projection {
        self.session.projection()
    }

    /// A handle for observing snapshots or issuing commands from elsewhere
    pub fn handle(&self) -> SessionHandle {
        self.session.clone()
    }

    pub fn subscriber_state(&self) -> SubscriberState {
        self.subscriber.state()
    }

    /// Tear down the subscriber and discard the session state
    pub fn shutdown(mut self) {
        self.subscriber.teardown();
        self.session_task.abort();
    }
}
