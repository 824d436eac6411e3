/// HTTP client for the notification service's send endpoint
use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SendRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
}

impl SendRequest {
    /// The `n`-th notification a user sends from the panel
    pub fn numbered(n: usize) -> Self {
        Self {
            title: Some(format!("New Notification {n}")),
            message: Some(format!("This is notification message {n}")),
            user_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    message: String,
}

#[derive(Clone)]
pub struct NotificationApi {
    client: reqwest::Client,
    base_url: String,
}

impl NotificationApi {
    /// `base_url` is the API root, e.g. `http://localhost:8000/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn send_url(&self) -> String {
        format!("{}/notifications/send", self.base_url)
    }

    /// Ask the service to create and broadcast a notification.
    ///
    /// Returns the service's acknowledgment message.
    pub async fn send(&self, request: &SendRequest) -> Result<String> {
        let response = self.client.post(self.send_url()).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
            });
        }

        let body: SendResponse = response.json().await?;
        debug!(ack = %body.message, "Notification accepted");
        Ok(body.message)
    }
}
