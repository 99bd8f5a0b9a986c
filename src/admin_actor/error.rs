use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdminError {
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
