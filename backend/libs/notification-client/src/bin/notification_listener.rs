//! Connects to the Redis broker and logs every projection change until Ctrl-C

use notification_broker::RedisBroker;
use notification_client::{ClientConfig, NotificationApi, NotificationSystem};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_target(false).init();

    let config = ClientConfig::from_env()?;
    let broker = RedisBroker::new(&config.redis_url).await?;
    let api = NotificationApi::new(config.api_base_url.clone());

    let system = NotificationSystem::start(Arc::new(broker), Some(api)).await?;
    let mut handle = system.handle();

    tracing::info!("Listening for notifications");

    loop {
        tokio::select! {
            changed = handle.changed() => {
                let projection = changed?;
                if let Some(latest) = projection.items.first() {
                    tracing::info!(
                        unread = projection.unread_count,
                        total = projection.items.len(),
                        title = %latest.title,
                        message = %latest.message,
                        "Notifications updated"
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    system.shutdown();
    tracing::info!("Listener stopped");
    Ok(())
}
