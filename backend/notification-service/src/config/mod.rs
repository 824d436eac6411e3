use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub broker: BrokerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Unset runs the service against the in-memory store
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Unset runs the service against the in-process broker
    pub redis_url: Option<String>,
    /// Capacity of the in-process side-channel for created notifications
    pub events_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = parse_first_or(&["APP_PORT", "PORT"], 8000)?;

        Ok(Config {
            app: AppConfig {
                env: optional("APP_ENV").unwrap_or_else(|| "development".to_string()),
                port,
            },
            database: DatabaseConfig {
                url: optional("DATABASE_URL"),
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            broker: BrokerConfig {
                redis_url: optional("REDIS_URL"),
                events_capacity: parse_or("NOTIFICATION_EVENTS_CAPACITY", 256)?,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.app.port)
    }
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{key} has an invalid value: {raw}")))
}

/// Parse the first of `keys` that is set, naming that key on failure
fn parse_first_or<T: FromStr>(keys: &[&str], default: T) -> Result<T> {
    keys.iter()
        .find_map(|key| optional(key).map(|raw| (*key, raw)))
        .map_or(Ok(default), |(key, raw)| parse(key, &raw))
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match optional(key) {
        Some(raw) => parse(key, &raw),
        None => Ok(default),
    }
}
