/// Notification producer
///
/// Persists an inbound notification, notifies side-channel listeners and publishes
/// `new-notification` on the global channel. Persistence and publish are not
/// transactional: a failed publish leaves the stored record in place and the request
/// still succeeds.
use super::{NotificationEvents, NotificationStore};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{Notification, SendNotificationRequest, SendNotificationResponse};
use notification_broker::{Broker, NEW_NOTIFICATION_EVENT, NOTIFICATION_CHANNEL};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct NotificationProducer {
    store: Arc<dyn NotificationStore>,
    broker: Arc<dyn Broker>,
    events: NotificationEvents,
}

impl NotificationProducer {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        broker: Arc<dyn Broker>,
        events: NotificationEvents,
    ) -> Self {
        Self {
            store,
            broker,
            events,
        }
    }

    /// Handle one send request
    ///
    /// Fails only with `AppError::Persistence`, in which case nothing was published.
    pub async fn send(&self, request: SendNotificationRequest) -> Result<SendNotificationResponse> {
        let notification = self.store.create(request.into()).await.map_err(|e| {
            metrics::record_persistence_failure();
            error!(error = %e, "Failed to persist notification, nothing published");
            match e {
                AppError::Persistence(_) => e,
                other => AppError::Persistence(other.to_string()),
            }
        })?;

        metrics::record_persisted();
        info!(notification_id = %notification.id, "Notification persisted");

        self.events.emit(&notification);

        if let Err(e) = self.broadcast(&notification).await {
            metrics::record_broadcast_failure();
            warn!(
                error = %e,
                notification_id = %notification.id,
                "Broadcast failed, notification remains stored"
            );
        }

        Ok(SendNotificationResponse::sent())
    }

    async fn broadcast(&self, notification: &Notification) -> Result<usize> {
        let subscribers = self
            .broker
            .publish(
                NOTIFICATION_CHANNEL,
                NEW_NOTIFICATION_EVENT,
                notification.broadcast_payload(),
            )
            .await?;

        metrics::record_published();
        debug!(
            notification_id = %notification.id,
            subscribers,
            "Broadcast new-notification"
        );
        Ok(subscribers)
    }
}
