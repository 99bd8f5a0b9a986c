use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::clients::CollectionClient;
use crate::domain::{Document, FieldValue, Fields};

use super::error::DatabaseError;
use super::messages::{CollectionRequest, Response, Snapshot, SnapshotStream};

type Watcher = mpsc::UnboundedSender<Result<Snapshot, DatabaseError>>;

/// In-process document collection with live queries ordered by `createdAt`
/// descending.
///
/// Every subscriber receives the current snapshot right away and a fresh full
/// snapshot after each write.
pub struct CollectionActor {
    name: String,
    receiver: mpsc::Receiver<CollectionRequest>,
    documents: HashMap<String, Document>,
    watchers: Vec<Watcher>,
    next_id_fn: Box<dyn Fn() -> String + Send + Sync>,
}

impl CollectionActor {
    pub fn new(
        name: impl Into<String>,
        buffer_size: usize,
        next_id_fn: impl Fn() -> String + Send + Sync + 'static,
    ) -> (Self, CollectionClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            name: name.into(),
            receiver,
            documents: HashMap::new(),
            watchers: Vec::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, CollectionClient::new(sender))
    }

    #[instrument(name = "collection", fields(collection = %self.name), skip(self))]
    pub async fn run(mut self) {
        info!("Collection starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CollectionRequest::Subscribe { respond_to } => {
                    self.handle_subscribe(respond_to);
                }
                CollectionRequest::Insert { fields, respond_to } => {
                    self.handle_insert(fields, respond_to);
                }
                CollectionRequest::Update {
                    id,
                    fields,
                    respond_to,
                } => {
                    self.handle_update(id, fields, respond_to);
                }
                CollectionRequest::Delete { id, respond_to } => {
                    self.handle_delete(id, respond_to);
                }
            }
        }

        info!("Collection stopped");
    }

    #[instrument(skip(self, respond_to))]
    fn handle_subscribe(&mut self, respond_to: Response<SnapshotStream>) {
        let (watcher, stream) = mpsc::unbounded_channel();
        if watcher.send(Ok(self.snapshot())).is_err() {
            return;
        }
        if respond_to.send(Ok(stream)).is_ok() {
            self.watchers.push(watcher);
            info!(watchers = self.watchers.len(), "Live query attached");
        }
    }

    #[instrument(skip(self, fields, respond_to))]
    fn handle_insert(&mut self, mut fields: Fields, respond_to: Response<String>) {
        let id = (self.next_id_fn)();
        fields
            .entry("createdAt")
            .or_insert_with(|| Value::String(server_timestamp()));
        self.documents.insert(id.clone(), Document::new(id.clone(), fields));
        debug!(document_id = %id, "Document inserted");

        let _ = respond_to.send(Ok(id));
        self.broadcast();
    }

    #[instrument(fields(document_id = %id), skip(self, fields, respond_to))]
    fn handle_update(
        &mut self,
        id: String,
        fields: Vec<(String, FieldValue)>,
        respond_to: Response<()>,
    ) {
        let Some(document) = self.documents.get_mut(&id) else {
            warn!("Update of missing document");
            let _ = respond_to.send(Err(DatabaseError::NotFound(id)));
            return;
        };

        for (key, value) in fields {
            let value = match value {
                FieldValue::Set(value) => value,
                FieldValue::ServerTimestamp => Value::String(server_timestamp()),
            };
            document.fields.insert(key, value);
        }
        info!("Document updated");

        let _ = respond_to.send(Ok(()));
        self.broadcast();
    }

    #[instrument(fields(document_id = %id), skip(self, respond_to))]
    fn handle_delete(&mut self, id: String, respond_to: Response<()>) {
        let removed = self.documents.remove(&id).is_some();
        info!(removed, "Document deleted");

        let _ = respond_to.send(Ok(()));
        if removed {
            self.broadcast();
        }
    }

    /// Documents with a readable `createdAt`, newest first.
    fn snapshot(&self) -> Snapshot {
        let mut ordered: Vec<_> = self
            .documents
            .values()
            .filter_map(|doc| doc.created_at().map(|at| (at, doc)))
            .collect();
        ordered.sort_by(|(a_at, a), (b_at, b)| b_at.cmp(a_at).then_with(|| a.id.cmp(&b.id)));

        Snapshot {
            documents: ordered.into_iter().map(|(_, doc)| doc.clone()).collect(),
        }
    }

    fn broadcast(&mut self) {
        let snapshot = self.snapshot();
        self.watchers
            .retain(|watcher| watcher.send(Ok(snapshot.clone())).is_ok());
        debug!(
            documents = snapshot.documents.len(),
            watchers = self.watchers.len(),
            "Snapshot pushed"
        );
    }
}

fn server_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_framework::order_fields;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn start() -> CollectionClient {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("doc_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = CollectionActor::new("orders", 10, next_id);
        tokio::spawn(actor.run());
        client
    }

    fn created(mut fields: Fields, at: &str) -> Fields {
        fields.insert("createdAt".to_string(), json!(at));
        fields
    }

    async fn next(stream: &mut SnapshotStream) -> Snapshot {
        stream.recv().await.unwrap().unwrap()
    }

    fn ids(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.documents.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_subscribe_delivers_current_snapshot_newest_first() {
        let client = start();
        let older = client
            .insert(created(order_fields("1001"), "2024-01-01T10:00:00Z"))
            .await
            .unwrap();
        let newer = client
            .insert(created(order_fields("1002"), "2024-01-02T10:00:00Z"))
            .await
            .unwrap();

        let mut stream = client.subscribe().await.unwrap();
        let snapshot = next(&mut stream).await;

        assert_eq!(ids(&snapshot), vec![newer.as_str(), older.as_str()]);
    }

    #[tokio::test]
    async fn test_insert_assigns_created_at() {
        let client = start();
        let mut stream = client.subscribe().await.unwrap();
        assert!(next(&mut stream).await.documents.is_empty());

        let id = client.insert(order_fields("1001")).await.unwrap();
        let snapshot = next(&mut stream).await;

        assert_eq!(ids(&snapshot), vec![id.as_str()]);
        assert!(snapshot.documents[0].created_at().is_some());
    }

    #[tokio::test]
    async fn test_documents_without_created_at_are_excluded() {
        let client = start();
        client
            .insert(created(order_fields("1001"), "not a date"))
            .await
            .unwrap();

        let mut stream = client.subscribe().await.unwrap();
        assert!(next(&mut stream).await.documents.is_empty());
    }

    #[tokio::test]
    async fn test_update_resolves_server_timestamp_and_pushes() {
        let client = start();
        let id = client.insert(order_fields("1001")).await.unwrap();
        let mut stream = client.subscribe().await.unwrap();
        next(&mut stream).await;

        client
            .update(
                id.clone(),
                vec![
                    ("status".to_string(), FieldValue::Set(json!("shipped"))),
                    ("updatedAt".to_string(), FieldValue::ServerTimestamp),
                ],
            )
            .await
            .unwrap();

        let snapshot = next(&mut stream).await;
        let fields = &snapshot.documents[0].fields;
        assert_eq!(fields["status"], json!("shipped"));
        assert!(fields["updatedAt"]
            .as_str()
            .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
            .is_some());
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let client = start();
        let err = client
            .update("ghost".to_string(), vec![("status".to_string(), FieldValue::Set(json!("shipped")))])
            .await
            .unwrap_err();
        assert_eq!(err, DatabaseError::NotFound("ghost".to_string()));
    }

    #[tokio::test]
    async fn test_delete_pushes_and_missing_delete_succeeds() {
        let client = start();
        let id = client.insert(order_fields("1001")).await.unwrap();
        let mut stream = client.subscribe().await.unwrap();
        assert_eq!(next(&mut stream).await.documents.len(), 1);

        client.delete(id.clone()).await.unwrap();
        assert!(next(&mut stream).await.documents.is_empty());

        assert_eq!(client.delete(id).await, Ok(()));
    }
}
