//! Thin handles around each actor's request channel.

#[macro_use]
mod macros;

mod admin_client;
mod collection_client;
mod notification_client;

pub use admin_client::AdminClient;
pub use collection_client::CollectionClient;
pub use notification_client::NotificationClient;
