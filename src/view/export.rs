use chrono::NaiveDate;

use crate::domain::Order;

use super::format::DateFormatter;

pub const CSV_MIME: &str = "text/csv";

pub const EXPORT_HEADERS: [&str; 9] = [
    "Order ID",
    "Customer Name",
    "Phone",
    "Email",
    "Address",
    "City",
    "Total",
    "Status",
    "Order Date",
];

/// A CSV blob ready to be offered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl CsvExport {
    pub fn build(orders: &[Order], formatter: &DateFormatter, prefix: &str, today: NaiveDate) -> Self {
        Self {
            file_name: export_file_name(prefix, today),
            mime: CSV_MIME,
            bytes: export_csv(orders, formatter),
        }
    }
}

/// `<prefix>-YYYY-MM-DD.csv`
pub fn export_file_name(prefix: &str, today: NaiveDate) -> String {
    format!("{}-{}.csv", prefix, today.format("%Y-%m-%d"))
}

/// Serializes orders to CSV.
///
/// Every field is wrapped in double quotes as-is; quotes and commas inside a
/// field are not escaped.
pub fn export_csv(orders: &[Order], formatter: &DateFormatter) -> Vec<u8> {
    let header = EXPORT_HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let rows = orders.iter().map(|order| {
        vec![
            order.display_id.clone(),
            order.name.clone(),
            order.phone.clone(),
            order.email.clone(),
            order.address.clone(),
            order.city.clone(),
            order.total.to_string(),
            order.status.to_string(),
            formatter.format(order.order_date),
        ]
    });

    std::iter::once(header)
        .chain(rows)
        .map(|row| {
            row.iter()
                .map(|field| format!("\"{}\"", field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes()
}
