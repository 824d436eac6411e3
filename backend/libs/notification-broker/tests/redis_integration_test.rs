//! Integration tests for the Redis broker
//!
//! These tests require a running Redis instance.
//! Run with: cargo test --test redis_integration_test -- --ignored

use notification_broker::{Broker, Payload, RedisBroker, NEW_NOTIFICATION_EVENT, NOTIFICATION_CHANNEL};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const REDIS_URL: &str = "redis://127.0.0.1:6379";

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_publish_and_receive_notification() {
    let broker = RedisBroker::new(REDIS_URL)
        .await
        .expect("Failed to connect to Redis");

    let subscription = broker
        .subscribe(NOTIFICATION_CHANNEL)
        .await
        .expect("Failed to subscribe");

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    subscription.bind(NEW_NOTIFICATION_EVENT, move |data| {
        let sink = Arc::clone(&sink);
        let data = data.clone();
        tokio::spawn(async move {
            sink.lock().await.push(data);
        });
    });

    // Give subscriber time to connect
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut payload = Payload::new();
    payload.insert("title".into(), json!("Hi"));
    payload.insert("message".into(), json!("There"));

    let subscriber_count = broker
        .publish(NOTIFICATION_CHANNEL, NEW_NOTIFICATION_EVENT, payload.clone())
        .await
        .expect("Failed to publish");
    assert!(subscriber_count > 0, "No subscribers received the event");

    tokio::time::sleep(Duration::from_millis(200)).await;

    let received = received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], payload);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_unsubscribe_stops_delivery() {
    let broker = RedisBroker::new(REDIS_URL)
        .await
        .expect("Failed to connect to Redis");

    let mut subscription = broker
        .subscribe("notification-channel-unsubscribe-test")
        .await
        .expect("Failed to subscribe");
    subscription.bind(NEW_NOTIFICATION_EVENT, |_| panic!("handler must not run"));

    subscription.unsubscribe_all();
    subscription.unsubscribe_all();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let subscriber_count = broker
        .publish(
            "notification-channel-unsubscribe-test",
            NEW_NOTIFICATION_EVENT,
            Payload::new(),
        )
        .await
        .expect("Failed to publish");
    assert_eq!(subscriber_count, 0);
}
