use tokio::sync::mpsc;

use crate::collection_actor::{CollectionRequest, DatabaseError, SnapshotStream};
use crate::domain::{FieldValue, Fields};

/// Handle to a document collection.
///
/// The same client type talks to the in-process [`CollectionActor`] and to the
/// mock receiver used in tests.
///
/// [`CollectionActor`]: crate::collection_actor::CollectionActor
#[derive(Clone)]
pub struct CollectionClient {
    sender: mpsc::Sender<CollectionRequest>,
}

impl CollectionClient {
    pub fn new(sender: mpsc::Sender<CollectionRequest>) -> Self {
        Self { sender }
    }
}

client_method!(CollectionClient => fn subscribe() -> SnapshotStream as CollectionRequest::Subscribe, Error = DatabaseError::Unavailable);
client_method!(CollectionClient => fn insert(fields: Fields) -> String as CollectionRequest::Insert, Error = DatabaseError::Unavailable);
client_method!(CollectionClient => fn update(id: String, fields: Vec<(String, FieldValue)>) -> () as CollectionRequest::Update, Error = DatabaseError::Unavailable);
client_method!(CollectionClient => fn delete(id: String) -> () as CollectionRequest::Delete, Error = DatabaseError::Unavailable);
