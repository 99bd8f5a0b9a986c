use thiserror::Error;

use crate::collection_actor::DatabaseError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error("Remote call failed: {0}")]
    Remote(#[from] DatabaseError),
}
