//! The admin session controller.

pub mod error;
mod service;
mod session;

pub use error::*;
pub use service::{AdminRequest, AdminService, AdminSettings, CommandOutcome};
