use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::admin_actor::AdminService;
use crate::clients::{AdminClient, CollectionClient, NotificationClient};
use crate::collection_actor::CollectionActor;
use crate::domain::Fields;
use crate::sync::{OrderSync, ORDERS_COLLECTION};

use super::config::AdminConfig;
use super::error::AppError;

/// Starts the actors, wires them together, and shuts them down.
///
/// Startup order: collection and notifications first, then the admin session
/// with the sync adapter injected, then the live query feeding the session.
pub struct AdminSystem {
    pub admin_client: AdminClient,
    pub notification_client: NotificationClient,
    pub collection_client: CollectionClient,
    subscription: JoinHandle<()>,
    handles: Vec<JoinHandle<()>>,
}

impl AdminSystem {
    /// Runs against the in-process `orders` collection.
    #[instrument(name = "admin_system", skip(config))]
    pub fn new(config: &AdminConfig) -> Self {
        let doc_id_counter = Arc::new(AtomicU64::new(1));
        let next_doc_id = move || {
            let id = doc_id_counter.fetch_add(1, Ordering::SeqCst);
            format!("order_doc_{}", id)
        };

        let (collection_actor, collection_client) =
            CollectionActor::new(ORDERS_COLLECTION, config.channel_buffer, next_doc_id);
        let collection_handle = tokio::spawn(collection_actor.run());

        Self::with_collection(config, collection_client, vec![collection_handle])
    }

    /// Runs against any collection client, e.g. a mock in tests.
    pub fn with_collection(
        config: &AdminConfig,
        collection_client: CollectionClient,
        mut handles: Vec<JoinHandle<()>>,
    ) -> Self {
        info!("Starting admin system");

        let (notification_service, notification_client) =
            crate::notification_actor::NotificationService::new(config.channel_buffer);
        handles.push(tokio::spawn(notification_service.run()));

        let sync = OrderSync::new(collection_client.clone(), notification_client.clone());
        let (admin_service, admin_client) = AdminService::new(
            config.channel_buffer,
            sync.clone(),
            notification_client.clone(),
            config.settings(),
        );
        handles.push(tokio::spawn(admin_service.run()));

        let subscription = sync.subscribe(admin_client.clone());

        info!("Admin system started");

        Self {
            admin_client,
            notification_client,
            collection_client,
            subscription,
            handles,
        }
    }

    /// Inserts seed documents into the collection.
    #[instrument(fields(documents = documents.len()), skip(self, documents))]
    pub async fn seed(&self, documents: Vec<Fields>) -> Result<(), AppError> {
        for fields in documents {
            self.collection_client.insert(fields).await?;
        }
        info!("Collection seeded");
        Ok(())
    }

    /// Stops the live query, closes every client, and waits for the actors.
    ///
    /// Errors are logged and shutdown continues, so one failed task cannot
    /// hang the rest.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), AppError> {
        info!("Shutting down admin system");

        self.subscription.abort();
        let _ = self.subscription.await;

        drop(self.admin_client);
        drop(self.notification_client);
        drop(self.collection_client);

        let mut failure = None;
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                failure = Some(AppError::Task(e.to_string()));
            }
        }

        info!("Admin system shutdown complete");
        failure.map_or(Ok(()), Err)
    }
}
