use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Currency suffix appended to every amount.
pub const CURRENCY: &str = "EGP";

const DATE_PATTERN: &str = "%b %-d, %Y, %I:%M %p";

/// Formats order timestamps for display, e.g. `Jan 5, 2024, 02:30 PM`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateFormatter {
    offset: FixedOffset,
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::utc()
    }
}

impl DateFormatter {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn format(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format(DATE_PATTERN).to_string()
    }
}

/// A stored total, shown as stored: `150 EGP`, `99.5 EGP`.
pub fn format_total(total: f64) -> String {
    format!("{} {}", total, CURRENCY)
}

/// A computed amount with two decimals: `20.00 EGP`.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2} {}", amount, CURRENCY)
}
