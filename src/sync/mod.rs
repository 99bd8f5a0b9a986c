//! Live query on the `orders` collection and the two single-document writes.
//!
//! Every remote failure ends here: it is logged, turned into an error
//! notification, and never retried. Nothing in the local mirror changes on a
//! failed write; the next push carries the truth.

mod error;

pub use error::SyncError;

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn, Instrument};

use crate::clients::{AdminClient, CollectionClient, NotificationClient};
use crate::collection_actor::Snapshot;
use crate::domain::{FieldValue, Order, OrderStatus};

pub const ORDERS_COLLECTION: &str = "orders";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this order?";

pub const LOAD_FAILED: &str = "Error loading orders";
pub const UPDATE_FAILED: &str = "Error updating order status";
pub const DELETE_FAILED: &str = "Error deleting order";
pub const DELETE_SUCCEEDED: &str = "Order deleted successfully";

/// The admin's answer to [`DELETE_PROMPT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    /// `y` or `yes` in any case confirms; anything else declines.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Confirmation::Confirmed,
            _ => Confirmation::Declined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

#[derive(Clone)]
pub struct OrderSync {
    orders: CollectionClient,
    notifications: NotificationClient,
}

impl OrderSync {
    pub fn new(orders: CollectionClient, notifications: NotificationClient) -> Self {
        Self {
            orders,
            notifications,
        }
    }

    /// Attaches the live query and feeds every push to `admin` until the stream
    /// closes.
    pub fn subscribe(&self, admin: AdminClient) -> JoinHandle<()> {
        let sync = self.clone();
        let span = tracing::info_span!("order_subscription", collection = ORDERS_COLLECTION);
        tokio::spawn(
            async move {
                let mut stream = match sync.orders.subscribe().await {
                    Ok(stream) => stream,
                    Err(e) => {
                        error!(error = %e, "Error loading orders");
                        sync.notifications.notify_error(LOAD_FAILED).await;
                        return;
                    }
                };
                info!("Live query established");

                while let Some(push) = stream.recv().await {
                    match push {
                        Ok(snapshot) => {
                            let orders = decode_snapshot(&snapshot);
                            if admin.replace_orders(orders).await.is_err() {
                                info!("Admin session closed, dropping live query");
                                return;
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Error loading orders");
                            sync.notifications.notify_error(LOAD_FAILED).await;
                        }
                    }
                }

                info!("Live query closed");
            }
            .instrument(span),
        )
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, external_id: String, status: OrderStatus) -> Result<(), SyncError> {
        let fields = vec![
            ("status".to_string(), FieldValue::Set(json!(status.as_str()))),
            ("updatedAt".to_string(), FieldValue::ServerTimestamp),
        ];

        match self.orders.update(external_id, fields).await {
            Ok(()) => {
                info!("Order status updated");
                self.notifications
                    .notify_success(format!("Order status updated to {}", status))
                    .await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error updating order status");
                self.notifications.notify_error(UPDATE_FAILED).await;
                Err(e.into())
            }
        }
    }

    /// Deletes only after an explicit confirmation; a declined prompt sends
    /// nothing.
    #[instrument(skip(self))]
    pub async fn delete_order(
        &self,
        external_id: String,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, SyncError> {
        if confirmation != Confirmation::Confirmed {
            info!("Delete not confirmed");
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.orders.delete(external_id).await {
            Ok(()) => {
                info!("Order deleted");
                self.notifications.notify_success(DELETE_SUCCEEDED).await;
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                error!(error = %e, "Error deleting order");
                self.notifications.notify_error(DELETE_FAILED).await;
                Err(e.into())
            }
        }
    }
}

/// Typed orders of a snapshot, in snapshot order. Documents that do not decode
/// are logged and left out.
pub fn decode_snapshot(snapshot: &Snapshot) -> Vec<Order> {
    snapshot
        .documents
        .iter()
        .filter_map(|document| match Order::try_from(document) {
            Ok(order) => Some(order),
            Err(e) => {
                warn!(document_id = %document.id, error = %e, "Quarantined order document");
                None
            }
        })
        .collect()
}
