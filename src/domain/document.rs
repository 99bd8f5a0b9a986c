use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::order::{CartItem, Order, OrderStatus};

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// Document key plus its fields, as delivered by the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Parsed `createdAt`, the field the live query orders by.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.fields
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.with_timezone(&Utc))
    }
}

/// Value written by a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Set(Value),
    /// Resolved to the collection's clock when the write is applied.
    ServerTimestamp,
}

/// Why a document was kept out of the mirror.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DocumentError {
    #[error("Malformed order document {id}: {reason}")]
    Malformed { id: String, reason: String },
    #[error("Order document {id} has cart item {item:?} with quantity {quantity}")]
    InvalidQuantity { id: String, item: String, quantity: u32 },
    #[error("Order document {id} has cart item {item:?} with price {price}")]
    InvalidPrice { id: String, item: String, price: f64 },
}

/// Order numbers are written as strings by some storefront versions and as
/// numbers by others.
#[derive(Deserialize)]
#[serde(untagged)]
enum DisplayId {
    Text(String),
    Number(serde_json::Number),
}

impl From<DisplayId> for String {
    fn from(value: DisplayId) -> Self {
        match value {
            DisplayId::Text(text) => text,
            DisplayId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderFields {
    id: DisplayId,
    status: OrderStatus,
    name: String,
    phone: String,
    email: String,
    address: String,
    city: String,
    #[serde(default)]
    notes: Option<String>,
    order_date: DateTime<Utc>,
    total: f64,
    cart: Vec<CartItem>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<&Document> for Order {
    type Error = DocumentError;

    fn try_from(document: &Document) -> Result<Self, Self::Error> {
        let fields: OrderFields = serde_json::from_value(Value::Object(document.fields.clone()))
            .map_err(|e| DocumentError::Malformed {
                id: document.id.clone(),
                reason: e.to_string(),
            })?;

        for item in &fields.cart {
            if item.quantity == 0 {
                return Err(DocumentError::InvalidQuantity {
                    id: document.id.clone(),
                    item: item.name.clone(),
                    quantity: item.quantity,
                });
            }
            if !item.price.is_finite() || item.price < 0.0 {
                return Err(DocumentError::InvalidPrice {
                    id: document.id.clone(),
                    item: item.name.clone(),
                    price: item.price,
                });
            }
        }

        Ok(Order {
            external_id: document.id.clone(),
            display_id: fields.id.into(),
            status: fields.status,
            name: fields.name,
            phone: fields.phone,
            email: fields.email,
            address: fields.address,
            city: fields.city,
            notes: fields.notes.filter(|notes| !notes.is_empty()),
            order_date: fields.order_date,
            total: fields.total,
            cart: fields.cart,
            updated_at: fields.updated_at,
        })
    }
}
