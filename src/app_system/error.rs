use thiserror::Error;

use crate::admin_actor::AdminError;
use crate::collection_actor::DatabaseError;

use super::config::ConfigError;

/// Errors that end the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Seeding the collection failed: {0}")]
    Seed(#[from] DatabaseError),
    #[error("Admin session failed: {0}")]
    Admin(#[from] AdminError),
    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Actor task failed: {0}")]
    Task(String),
}
