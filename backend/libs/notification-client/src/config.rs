use crate::error::{ClientError, Result};
use std::env;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Notification API root, e.g. `http://localhost:8000/api`
    pub api_base_url: String,
    pub redis_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            env::var("NOTIFICATION_API_BASE_URL").ok(),
            env::var("REDIS_URL").ok(),
        )
    }

    fn from_values(api_base_url: Option<String>, redis_url: Option<String>) -> Result<Self> {
        let api_base_url = api_base_url.unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let redis_url = redis_url
            .ok_or_else(|| ClientError::Configuration("REDIS_URL must be set".to_string()))?;

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ClientError::Configuration(format!(
                "NOTIFICATION_API_BASE_URL must be an http(s) URL: {api_base_url}"
            )));
        }

        Ok(Self {
            api_base_url,
            redis_url,
        })
    }
}
