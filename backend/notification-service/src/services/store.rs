/// Notification persistence
///
/// The store is an external collaborator reached only through `create`. Any failure
/// is reported as `AppError::Persistence`.
use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::{NewNotification, Notification, RecipientSelector};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;
use tracing::{error, info};

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a new notification and return it with its server-assigned id
    async fn create(&self, fields: NewNotification) -> Result<Notification>;
}

/// PostgreSQL-backed store
pub struct PgNotificationStore {
    db: PgPool,
}

impl PgNotificationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;

        info!(
            max_connections = config.max_connections,
            "Successfully connected to database"
        );
        Ok(Self::new(db))
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn create(&self, fields: NewNotification) -> Result<Notification> {
        let draft = Notification::create(fields);

        let query = r#"
            INSERT INTO notifications (id, title, message, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, message, user_id, created_at
        "#;

        let row = sqlx::query(query)
            .bind(draft.id)
            .bind(&draft.title)
            .bind(&draft.message)
            .bind(draft.user_id.clone().map(|selector| selector.0))
            .bind(draft.created_at)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to create notification: {}", e);
                AppError::Persistence(format!("Failed to create notification: {}", e))
            })?;

        let user_id: Option<serde_json::Value> = row.get("user_id");
        Ok(Notification {
            id: row.get("id"),
            title: row.get("title"),
            message: row.get("message"),
            user_id: user_id.map(RecipientSelector),
            created_at: row.get("created_at"),
        })
    }
}

/// In-memory store for local development and tests
#[derive(Default)]
pub struct MemoryNotificationStore {
    records: RwLock<Vec<Notification>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Snapshot of every stored record, oldest first
    pub async fn all(&self) -> Vec<Notification> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, fields: NewNotification) -> Result<Notification> {
        let notification = Notification::create(fields);
        self.records.write().await.push(notification.clone());
        Ok(notification)
    }
}
