//! Projection of filtered orders into a surface-independent view model.
//!
//! Each card carries its row controls as command objects already bound to the
//! order's document key, so a surface only has to hand the command back to the
//! admin session.

use crate::domain::{Order, OrderStatus};
use crate::sync::Confirmation;

use super::format::{format_amount, format_total, DateFormatter};

/// Placeholder shown when the mirror is loaded but nothing passes the filters.
pub const NO_ORDERS: &str = "No orders found";

/// Placeholder shown before the first snapshot arrives.
pub const LOADING: &str = "Loading orders...";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum OrderListView {
    #[default]
    Loading,
    Empty,
    Cards(Vec<OrderCard>),
}

impl OrderListView {
    pub fn cards(&self) -> &[OrderCard] {
        match self {
            OrderListView::Cards(cards) => cards,
            OrderListView::Loading | OrderListView::Empty => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderCard {
    pub external_id: String,
    pub status: OrderStatus,
    pub heading: String,
    pub date: String,
    pub total: String,
    pub customer: CustomerBlock,
    pub items: Vec<CartLine>,
    pub status_select: StatusSelect,
    pub call: CallAction,
    pub delete: DeleteAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerBlock {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub label: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusOption {
    pub status: OrderStatus,
    pub label: &'static str,
    pub selected: bool,
}

/// Status selector of one card.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSelect {
    target: String,
    pub options: Vec<StatusOption>,
}

impl StatusSelect {
    pub fn selected(&self) -> Option<OrderStatus> {
        self.options.iter().find(|option| option.selected).map(|option| option.status)
    }

    pub fn on_change(&self, status: OrderStatus) -> AdminCommand {
        AdminCommand::UpdateStatus {
            external_id: self.target.clone(),
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallAction {
    pub uri: String,
}

impl CallAction {
    pub fn activate(&self) -> AdminCommand {
        AdminCommand::Call {
            uri: self.uri.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteAction {
    target: String,
}

impl DeleteAction {
    pub fn activate(&self, confirmation: Confirmation) -> AdminCommand {
        AdminCommand::Delete {
            external_id: self.target.clone(),
            confirmation,
        }
    }
}

/// What a row control asks the admin session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    UpdateStatus {
        external_id: String,
        status: OrderStatus,
    },
    Call {
        uri: String,
    },
    Delete {
        external_id: String,
        confirmation: Confirmation,
    },
}

pub fn render(orders: &[&Order], formatter: &DateFormatter) -> OrderListView {
    if orders.is_empty() {
        return OrderListView::Empty;
    }
    OrderListView::Cards(orders.iter().map(|order| card(order, formatter)).collect())
}

fn card(order: &Order, formatter: &DateFormatter) -> OrderCard {
    let items = order
        .cart
        .iter()
        .map(|item| CartLine {
            label: format!("{} x{}", item.name, item.quantity),
            amount: format_amount(item.line_total()),
        })
        .collect();

    let options = OrderStatus::ALL
        .iter()
        .map(|&status| StatusOption {
            status,
            label: status.label(),
            selected: status == order.status,
        })
        .collect();

    OrderCard {
        external_id: order.external_id.clone(),
        status: order.status,
        heading: format!("#{}", order.display_id),
        date: formatter.format(order.order_date),
        total: format_total(order.total),
        customer: CustomerBlock {
            name: order.name.clone(),
            phone: order.phone.clone(),
            email: order.email.clone(),
            address: format!("{}, {}", order.address, order.city),
            notes: order.notes.clone().filter(|notes| !notes.is_empty()),
        },
        items,
        status_select: StatusSelect {
            target: order.external_id.clone(),
            options,
        },
        call: CallAction {
            uri: format!("tel:{}", order.phone),
        },
        delete: DeleteAction {
            target: order.external_id.clone(),
        },
    }
}
