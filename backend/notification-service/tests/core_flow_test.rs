//! End-to-end flow: producer -> broker -> client subscriber -> client store

use actix_web::{web, App, HttpServer};
use notification_broker::MemoryBroker;
use notification_client::{
    ClientError, NotificationApi, NotificationSystem, SendRequest, SubscriberState,
    DEFAULT_MESSAGE, DEFAULT_TITLE,
};
use notification_service::handlers::register_routes;
use notification_service::models::{RecipientSelector, SendNotificationRequest, NOTIFICATION_SENT};
use notification_service::{MemoryNotificationStore, NotificationEvents, NotificationProducer};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn producer_for(broker: &MemoryBroker) -> NotificationProducer {
    NotificationProducer::new(
        Arc::new(MemoryNotificationStore::new()),
        Arc::new(broker.clone()),
        NotificationEvents::default(),
    )
}

/// Serve the send endpoint on an ephemeral port, returning the API root URL
fn spawn_service(broker: &MemoryBroker) -> String {
    let producer = Arc::new(producer_for(broker));
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(producer.clone()))
            .configure(register_routes)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}/api")
}

#[tokio::test]
async fn test_send_reaches_connected_client() {
    let broker = MemoryBroker::new();
    let producer = producer_for(&broker);

    let system = NotificationSystem::start(Arc::new(broker.clone()), None)
        .await
        .unwrap();
    assert_eq!(system.subscriber_state(), SubscriberState::Connected);
    let mut handle = system.handle();

    producer
        .send(SendNotificationRequest {
            title: Some("Hi".to_string()),
            message: Some("There".to_string()),
            user_id: Some(RecipientSelector(json!(7))),
        })
        .await
        .unwrap();

    let projection = handle.wait_for(|p| p.unread_count == 1).await.unwrap();
    assert_eq!(projection.items.len(), 1);
    assert_eq!(projection.items[0].title, "Hi");
    assert_eq!(projection.items[0].message, "There");
    assert!(!projection.items[0].read);
}

#[tokio::test]
async fn test_missing_fields_use_display_defaults() {
    let broker = MemoryBroker::new();
    let producer = producer_for(&broker);
    let system = NotificationSystem::start(Arc::new(broker.clone()), None)
        .await
        .unwrap();
    let mut handle = system.handle();

    producer.send(SendNotificationRequest::default()).await.unwrap();

    let projection = handle.wait_for(|p| p.unread_count == 1).await.unwrap();
    assert_eq!(projection.items[0].title, DEFAULT_TITLE);
    assert_eq!(projection.items[0].message, DEFAULT_MESSAGE);
}

#[tokio::test]
async fn test_every_client_receives_every_notification() {
    let broker = MemoryBroker::new();
    let producer = producer_for(&broker);

    let first = NotificationSystem::start(Arc::new(broker.clone()), None)
        .await
        .unwrap();
    let second = NotificationSystem::start(Arc::new(broker.clone()), None)
        .await
        .unwrap();

    // user_id does not target a channel: both clients see both notifications
    for user in [1, 2] {
        producer
            .send(SendNotificationRequest {
                title: Some(format!("for user {user}")),
                message: None,
                user_id: Some(RecipientSelector(json!(user))),
            })
            .await
            .unwrap();
    }

    for system in [&first, &second] {
        let projection = system
            .handle()
            .wait_for(|p| p.items.len() == 2)
            .await
            .unwrap();
        assert_eq!(projection.items[0].title, "for user 2");
        assert_eq!(projection.items[1].title, "for user 1");
        assert_eq!(projection.unread_count, 2);
    }
}

#[tokio::test]
async fn test_mark_read_then_new_arrivals() {
    let broker = MemoryBroker::new();
    let producer = producer_for(&broker);
    let system = NotificationSystem::start(Arc::new(broker.clone()), None)
        .await
        .unwrap();
    let mut handle = system.handle();

    for idx in 0..3 {
        producer
            .send(SendNotificationRequest {
                title: Some(format!("n{idx}")),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    handle.wait_for(|p| p.items.len() == 3).await.unwrap();

    system.mark_all_as_read().unwrap();
    handle.wait_for(|p| p.unread_count == 0).await.unwrap();

    producer
        .send(SendNotificationRequest {
            title: Some("n3".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let projection = handle.wait_for(|p| p.items.len() == 4).await.unwrap();
    assert_eq!(projection.unread_count, 1);
    assert_eq!(projection.items[0].title, "n3");
    assert!(projection.items[1..].iter().all(|n| n.read));
}

#[tokio::test]
async fn test_no_delivery_after_shutdown() {
    let broker = MemoryBroker::new();
    let producer = producer_for(&broker);
    let system = NotificationSystem::start(Arc::new(broker.clone()), None)
        .await
        .unwrap();

    system.shutdown();
    tokio::time::sleep(Duration::from_millis(20)).await;

    producer
        .send(SendNotificationRequest {
            title: Some("late".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(broker.subscriber_count("notification-channel").await, 0);
}

#[actix_web::test]
async fn test_client_send_numbers_from_item_count() {
    let broker = MemoryBroker::new();
    let base_url = spawn_service(&broker);

    let system = NotificationSystem::start(
        Arc::new(broker.clone()),
        Some(NotificationApi::new(base_url.clone())),
    )
    .await
    .unwrap();
    let mut handle = system.handle();

    system.send_notification().await;
    let projection = tokio::time::timeout(
        Duration::from_secs(5),
        handle.wait_for(|p| p.items.len() == 1),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(projection.items[0].title, "New Notification 1");
    assert_eq!(projection.items[0].message, "This is notification message 1");

    system.send_notification().await;
    let projection = tokio::time::timeout(
        Duration::from_secs(5),
        handle.wait_for(|p| p.items.len() == 2),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(projection.items[0].title, "New Notification 2");
    assert_eq!(projection.items[1].title, "New Notification 1");
    assert_eq!(projection.unread_count, 2);
}

#[actix_web::test]
async fn test_client_api_ack_and_error_status() {
    let broker = MemoryBroker::new();
    let base_url = spawn_service(&broker);

    let ack = NotificationApi::new(base_url.clone())
        .send(&SendRequest::numbered(1))
        .await
        .unwrap();
    assert_eq!(ack, NOTIFICATION_SENT);

    let missing = NotificationApi::new(format!("{base_url}/missing"))
        .send(&SendRequest::numbered(1))
        .await;
    assert!(matches!(missing, Err(ClientError::Api { status: 404 })));
}
