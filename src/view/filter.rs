use crate::domain::{Order, StatusFilter};

/// Applies the status filter, then the search term, keeping input order.
///
/// The term matches the customer name and the order number case-insensitively,
/// or the raw phone string verbatim. Any one match keeps the order.
pub fn apply<'a>(orders: &'a [Order], filter: StatusFilter, search: &str) -> Vec<&'a Order> {
    let needle = search.to_lowercase();
    orders
        .iter()
        .filter(|order| filter.matches(order.status))
        .filter(|order| search.is_empty() || matches_search(order, search, &needle))
        .collect()
}

fn matches_search(order: &Order, raw: &str, lowered: &str) -> bool {
    order.name.to_lowercase().contains(lowered)
        || order.phone.contains(raw)
        || order.display_id.to_lowercase().contains(lowered)
}
