use crate::domain::{Order, StatusFilter};
use crate::mirror::OrderMirror;
use crate::view::filter::apply;
use crate::view::{render, DateFormatter, OrderListView};

/// State of one admin session: the mirror plus the active filter and search.
#[derive(Debug, Default)]
pub struct AdminSession {
    mirror: OrderMirror,
    filter: StatusFilter,
    search: String,
}

impl AdminSession {
    pub fn new() -> Self {
        Self {
            mirror: OrderMirror::new(),
            filter: StatusFilter::All,
            search: String::new(),
        }
    }

    pub fn replace_orders(&mut self, orders: Vec<Order>) {
        self.mirror.replace(orders);
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn set_search(&mut self, term: String) {
        self.search = term;
    }

    pub fn mirror(&self) -> &OrderMirror {
        &self.mirror
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn view(&self, formatter: &DateFormatter) -> OrderListView {
        if !self.mirror.is_loaded() {
            return OrderListView::Loading;
        }
        render(&apply(self.mirror.orders(), self.filter, &self.search), formatter)
    }
}
