//! # Mock Framework
//!
//! Utilities for testing the admin stack without a live collection.
//!
//! Use [`create_mock_collection`] to get a [`CollectionClient`] and the receiver
//! its requests arrive on. Then use helpers like [`expect_subscribe`] or
//! [`expect_update`] to assert the request and answer it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::app_system::{AdminConfig, AdminSystem};
use crate::clients::{CollectionClient, NotificationClient};
use crate::collection_actor::{CollectionRequest, DatabaseError, Snapshot, SnapshotStream};
use crate::domain::{FieldValue, Fields, Order, OrderStatus};
use crate::notification_actor::Notification;

type Responder<T> = oneshot::Sender<Result<T, DatabaseError>>;

pub type Pushes = mpsc::UnboundedSender<Result<Snapshot, DatabaseError>>;

/// How long async assertions wait before failing.
pub const WAIT: Duration = Duration::from_secs(2);

/// Creates a collection client whose requests land on the returned receiver.
///
/// Answering (or dropping) the responders lets a test decide what the remote
/// side does: succeed, fail, or never reply.
pub fn create_mock_collection(buffer_size: usize) -> (CollectionClient, mpsc::Receiver<CollectionRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (CollectionClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Subscribe request
pub async fn expect_subscribe(
    receiver: &mut mpsc::Receiver<CollectionRequest>,
) -> Option<Responder<SnapshotStream>> {
    match receiver.recv().await {
        Some(CollectionRequest::Subscribe { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update(
    receiver: &mut mpsc::Receiver<CollectionRequest>,
) -> Option<(String, Vec<(String, FieldValue)>, Responder<()>)> {
    match receiver.recv().await {
        Some(CollectionRequest::Update {
            id,
            fields,
            respond_to,
        }) => Some((id, fields, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete(
    receiver: &mut mpsc::Receiver<CollectionRequest>,
) -> Option<(String, Responder<()>)> {
    match receiver.recv().await {
        Some(CollectionRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Answers a Subscribe with a live stream and hands back its sending half.
pub fn open_stream(respond_to: Responder<SnapshotStream>) -> Pushes {
    let (pushes, stream) = mpsc::unbounded_channel();
    let _ = respond_to.send(Ok(stream));
    pushes
}

/// Starts the whole system on a mock collection and answers its live query.
///
/// Returns the request receiver for later writes and the sender that pushes
/// snapshots down the live query.
pub async fn start_mock_system(
    config: &AdminConfig,
) -> (AdminSystem, mpsc::Receiver<CollectionRequest>, Pushes) {
    let (collection, mut requests) = create_mock_collection(10);
    let system = AdminSystem::with_collection(config, collection, Vec::new());

    let respond_to = expect_subscribe(&mut requests)
        .await
        .expect("Expected Subscribe request");
    let pushes = open_stream(respond_to);
    (system, requests, pushes)
}

/// Waits until a notification with `message` is on the stack.
pub async fn wait_for_notification(notifications: &NotificationClient, message: &str) -> Notification {
    let mut updates = notifications.updates();
    let active = timeout(WAIT, updates.wait_for(|active| active.iter().any(|n| n.message == message)))
        .await
        .unwrap_or_else(|_| panic!("Timed out waiting for notification {message:?}"))
        .expect("Notification service closed");
    active
        .iter()
        .find(|n| n.message == message)
        .cloned()
        .expect("Notification present")
}

/// A pending order placed on 2024-01-05 14:30 UTC, with an empty cart.
pub fn order(external_id: &str, display_id: &str) -> Order {
    Order {
        external_id: external_id.to_string(),
        display_id: display_id.to_string(),
        status: OrderStatus::Pending,
        name: "Test Customer".to_string(),
        phone: "0123456789".to_string(),
        email: "customer@example.com".to_string(),
        address: "1 Test St".to_string(),
        city: "Giza".to_string(),
        notes: None,
        order_date: order_date(),
        total: 150.0,
        cart: Vec::new(),
        updated_at: None,
    }
}

/// Stored fields of a valid order document, without `createdAt`.
pub fn order_fields(display_id: &str) -> Fields {
    let value = json!({
        "id": display_id,
        "status": "pending",
        "name": "Test Customer",
        "phone": "0123456789",
        "email": "customer@example.com",
        "address": "1 Test St",
        "city": "Giza",
        "notes": "",
        "orderDate": "2024-01-05T14:30:00Z",
        "total": 150,
        "cart": [{"name": "Hat", "quantity": 2, "price": 75}],
    });
    match value {
        serde_json::Value::Object(fields) => fields,
        _ => Fields::new(),
    }
}

fn order_date() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-05T14:30:00Z")
        .map(|date| date.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Document;

    #[tokio::test]
    async fn test_mock_collection() {
        let (client, mut receiver) = create_mock_collection(10);

        let delete_task = tokio::spawn(async move { client.delete("doc_1".to_string()).await });

        let (id, responder) = expect_delete(&mut receiver).await.expect("Expected Delete request");
        assert_eq!(id, "doc_1");
        responder.send(Err(DatabaseError::Rejected("permission denied".to_string()))).unwrap();

        let result = delete_task.await.unwrap();
        assert_eq!(result, Err(DatabaseError::Rejected("permission denied".to_string())));
    }

    #[test]
    fn test_fixture_fields_decode_to_fixture_order() {
        let decoded = Order::try_from(&Document::new("doc_1", order_fields("1001"))).unwrap();
        let mut expected = order("doc_1", "1001");
        expected.cart = decoded.cart.clone();

        assert_eq!(decoded, expected);
        assert!(!order_fields("1001").contains_key("createdAt"));
    }
}
