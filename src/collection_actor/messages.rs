use tokio::sync::{mpsc, oneshot};

use crate::domain::{Document, FieldValue, Fields};

use super::error::DatabaseError;

pub type Response<T> = oneshot::Sender<Result<T, DatabaseError>>;

/// Full result set of the live query at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub documents: Vec<Document>,
}

/// Items pushed to a live subscription.
pub type SnapshotStream = mpsc::UnboundedReceiver<Result<Snapshot, DatabaseError>>;

#[derive(Debug)]
pub enum CollectionRequest {
    Subscribe {
        respond_to: Response<SnapshotStream>,
    },
    Insert {
        fields: Fields,
        respond_to: Response<String>,
    },
    Update {
        id: String,
        fields: Vec<(String, FieldValue)>,
        respond_to: Response<()>,
    },
    Delete {
        id: String,
        respond_to: Response<()>,
    },
}
