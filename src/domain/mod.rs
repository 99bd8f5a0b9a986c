pub mod order;
pub mod document;

pub use order::*;
pub use document::*;
