//! Transient, auto-dismissing notifications.

pub mod entity;
pub mod error;
mod service;

pub use entity::*;
pub use error::*;
pub use service::{NotificationRequest, NotificationService};
