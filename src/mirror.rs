//! Local copy of the `orders` collection, replaced in full on every push.

use std::collections::HashSet;

use tracing::warn;

use crate::domain::Order;

/// Ordered mirror of the remote order set.
///
/// Starts out not loaded; the first [`OrderMirror::replace`] marks it loaded even
/// when the pushed snapshot is empty.
#[derive(Debug, Default)]
pub struct OrderMirror {
    orders: Vec<Order>,
    loaded: bool,
}

impl OrderMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole mirror with `orders`, keeping their order.
    ///
    /// A repeated document key keeps its first occurrence.
    pub fn replace(&mut self, orders: Vec<Order>) {
        let mut seen = HashSet::with_capacity(orders.len());
        let mut kept = Vec::with_capacity(orders.len());
        for order in orders {
            if seen.insert(order.external_id.clone()) {
                kept.push(order);
            } else {
                warn!(external_id = %order.external_id, "Duplicate document key in snapshot");
            }
        }
        self.orders = kept;
        self.loaded = true;
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, external_id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.external_id == external_id)
    }
}
