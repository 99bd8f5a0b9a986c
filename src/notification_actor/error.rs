use thiserror::Error;

#[allow(dead_code)]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotificationError {
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
