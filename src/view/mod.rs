//! Pure presentation: formatting, filtering, rendering, and CSV export.

pub mod format;
pub mod filter;
pub mod render;
pub mod export;

pub use format::DateFormatter;
pub use render::*;
pub use export::CsvExport;
