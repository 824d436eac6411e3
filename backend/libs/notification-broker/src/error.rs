//! Error types for broker operations

use thiserror::Error;

/// Broker errors
#[derive(Error, Debug)]
pub enum BrokerError {
    /// Redis connection or operation error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Event envelope serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Broker has been shut down and accepts no more publishers or subscribers
    #[error("Broker closed: {0}")]
    Closed(String),
}
