use thiserror::Error;

/// Errors reported by the document collection.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DatabaseError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Write rejected: {0}")]
    /// Raised by remote stores; the in-process collection accepts every write.
    #[allow(dead_code)]
    Rejected(String),
    #[error("Collection unavailable: {0}")]
    Unavailable(String),
}
