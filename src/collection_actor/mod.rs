//! In-process stand-in for the remote `orders` document collection.

mod actor;
pub mod error;
pub mod messages;

pub use actor::CollectionActor;
pub use error::*;
pub use messages::*;
