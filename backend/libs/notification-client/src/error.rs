//! Error types for the notification client

use notification_broker::BrokerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Subscribe or transport failure
    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    /// Request to the notification API could not be completed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Notification API answered with a non-success status
    #[error("Notification API returned status {status}")]
    Api { status: u16 },

    /// `connect` after `teardown`
    #[error("Broker connection already released")]
    ConnectionReleased,

    /// The session event loop has stopped
    #[error("Notification session closed")]
    SessionClosed,

    #[error("Configuration error: {0}")]
    Configuration(String),
}
