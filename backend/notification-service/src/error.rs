use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use notification_broker::BrokerError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// Store unreachable or write rejected. Surfaced to the caller, never retried.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Publish failed or broker unreachable. Only ever logged and counted.
    #[error("broadcast failure: {0}")]
    Broadcast(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Persistence(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::Persistence(e.to_string())
    }
}

impl From<BrokerError> for AppError {
    fn from(e: BrokerError) -> Self {
        AppError::Broadcast(e.to_string())
    }
}

impl AppError {
    /// Machine-readable error code included in response bodies
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIGURATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Persistence(_) => "PERSISTENCE_FAILURE",
            AppError::Broadcast(_) => "BROADCAST_FAILURE",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Persistence(_) | AppError::Broadcast(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }))
    }
}
