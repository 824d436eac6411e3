/// Broadcast side-channel for created notifications
///
/// Fired once per successfully persisted notification, before the broker publish.
/// Fire-and-forget: with no listener attached the record is simply not observed.
use crate::models::Notification;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct NotificationEvents {
    sender: broadcast::Sender<Notification>,
}

impl NotificationEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _rx) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Hand `notification` to every attached listener; returns how many there were
    pub fn emit(&self, notification: &Notification) -> usize {
        match self.sender.send(notification.clone()) {
            Ok(listeners) => listeners,
            Err(_) => {
                debug!(notification_id = %notification.id, "No side-channel listeners");
                0
            }
        }
    }
}

impl Default for NotificationEvents {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Audit log consumer: one structured log line per created notification
pub fn spawn_audit_log(events: &NotificationEvents) -> JoinHandle<()> {
    let mut rx = events.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    let recipient = notification.user_id.as_ref().map(|selector| &selector.0);
                    info!(
                        target: "notification_audit",
                        notification_id = %notification.id,
                        title = ?notification.title,
                        user_id = ?recipient,
                        created_at = %notification.created_at,
                        "Notification created"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(target: "notification_audit", skipped, "Audit log lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
