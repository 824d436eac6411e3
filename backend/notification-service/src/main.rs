use actix_web::{middleware, web, App, HttpServer};
use notification_broker::{Broker, MemoryBroker, RedisBroker};
use notification_service::{
    handlers::register_routes as register_notifications, metrics, spawn_audit_log, Config,
    MemoryNotificationStore, NotificationEvents, NotificationProducer, NotificationStore,
    PgNotificationStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting notification service");

    let config = Config::from_env()?;

    let store: Arc<dyn NotificationStore> = match &config.database.url {
        Some(url) => {
            let store = PgNotificationStore::connect(url, &config.database).await?;
            store.run_migrations().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Notifications are kept in memory only");
            Arc::new(MemoryNotificationStore::new())
        }
    };

    let broker: Arc<dyn Broker> = match &config.broker.redis_url {
        Some(url) => Arc::new(RedisBroker::new(url).await?),
        None => {
            tracing::warn!("REDIS_URL not set. Using in-process broker, no external subscribers can connect");
            Arc::new(MemoryBroker::new())
        }
    };

    let events = NotificationEvents::new(config.broker.events_capacity);
    let _audit_log = spawn_audit_log(&events);

    let producer = Arc::new(NotificationProducer::new(store, broker, events));

    let addr = config.bind_address();
    tracing::info!(env = %config.app.env, "Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(producer.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(metrics::MetricsMiddleware)
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(register_notifications)
    })
    .bind(&addr)?
    .run()
    .await?;

    Ok(())
}
