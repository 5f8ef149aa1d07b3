//! Order snapshots as returned by the Order Query Service.
//!
//! The backend speaks camelCase JSON. Payloads are decoded in two steps: first into
//! a permissive [`WireOrder`] where every field is optional, then validated into the
//! immutable [`Order`]. Anything that fails validation is a [`ShapeError`], which the
//! clients surface as a malformed payload.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Display;
use thiserror::Error;

/// Type-safe identifier for Orders.
///
/// Opaque to the client. Numeric ids sent by the backend are kept in their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(pub String);

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type-safe identifier for Users.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in user, as handed over by the session layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: UserId,
    pub name: String,
}

impl Identity {
    pub fn new(user_id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
        }
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: Option<String>,
    /// Absent when the menu item has since been removed from the catalog.
    pub menu_item_name: Option<String>,
    pub quantity: u32,
    pub price_per_item: f64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price_per_item * f64::from(self.quantity)
    }

    pub fn display_name(&self) -> &str {
        self.menu_item_name.as_deref().unwrap_or("Item not available")
    }
}

/// An immutable order snapshot. Each poll produces a brand new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub status: String,
    pub order_date: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivery_address: String,
    pub total_amount: f64,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Creates an order with the given id and status and no other details.
    pub fn new(id: impl Into<OrderId>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            order_date: None,
            delivered_at: None,
            delivery_address: String::new(),
            total_amount: 0.0,
            items: Vec::new(),
        }
    }

    /// True once the backend reports the terminal stage together with a delivery time.
    pub fn is_delivered(&self) -> bool {
        crate::model::Stage::from_status(&self.status) == Some(crate::model::Stage::Delivered)
            && self.delivered_at.is_some()
    }
}

/// Reasons a payload cannot become an [`Order`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShapeError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `id` has unsupported type: {0}")]
    InvalidId(String),

    #[error("invalid timestamp in `{field}`: {value}")]
    Timestamp { field: &'static str, value: String },

    #[error("invalid amount in `{field}`: {value}")]
    Amount { field: &'static str, value: f64 },

    #[error("item quantity must be positive, got {0}")]
    Quantity(i64),
}

/// Order payload exactly as it arrives over the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrder {
    pub id: Option<Value>,
    pub status: Option<String>,
    pub order_date: Option<String>,
    pub delivered_at: Option<String>,
    pub delivery_address: Option<String>,
    pub total_amount: Option<f64>,
    pub items: Option<Vec<WireOrderItem>>,
}

/// Order line payload exactly as it arrives over the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrderItem {
    pub id: Option<Value>,
    pub menu_item_name: Option<String>,
    pub quantity: Option<i64>,
    pub price_per_item: Option<f64>,
}

impl TryFrom<WireOrder> for Order {
    type Error = ShapeError;

    fn try_from(wire: WireOrder) -> Result<Self, Self::Error> {
        let id = match wire.id {
            Some(Value::Null) | None => return Err(ShapeError::MissingField("id")),
            Some(value) => id_from_value(value)?,
        };
        let status = wire.status.ok_or(ShapeError::MissingField("status"))?;

        let total_amount = wire.total_amount.unwrap_or(0.0);
        check_amount("totalAmount", total_amount)?;

        let items = wire
            .items
            .unwrap_or_default()
            .into_iter()
            .map(OrderItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: OrderId(id),
            status,
            order_date: parse_timestamp("orderDate", wire.order_date)?,
            delivered_at: parse_timestamp("deliveredAt", wire.delivered_at)?,
            delivery_address: wire.delivery_address.unwrap_or_default(),
            total_amount,
            items,
        })
    }
}

impl TryFrom<WireOrderItem> for OrderItem {
    type Error = ShapeError;

    fn try_from(wire: WireOrderItem) -> Result<Self, Self::Error> {
        let quantity = wire.quantity.unwrap_or(0);
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(ShapeError::Quantity(quantity))?;
        let price_per_item = wire.price_per_item.unwrap_or(0.0);
        check_amount("pricePerItem", price_per_item)?;

        let id = match wire.id {
            Some(Value::Null) | None => None,
            Some(value) => Some(id_from_value(value)?),
        };

        Ok(Self {
            id,
            menu_item_name: wire.menu_item_name,
            quantity,
            price_per_item,
        })
    }
}

fn id_from_value(value: Value) -> Result<String, ShapeError> {
    match value {
        Value::String(s) if s.is_empty() => Err(ShapeError::MissingField("id")),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ShapeError::InvalidId(other.to_string())),
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), ShapeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ShapeError::Amount { field, value })
    }
}

// RFC 3339 first, then a zone-less ISO timestamp read as UTC.
fn parse_timestamp(
    field: &'static str,
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, ShapeError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| ShapeError::Timestamp { field, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn decode(json: &str) -> Result<Order, ShapeError> {
        let wire: WireOrder = serde_json::from_str(json).unwrap();
        Order::try_from(wire)
    }

    #[test]
    fn test_decodes_full_payload() {
        let order = decode(
            r#"{
                "id": 42,
                "status": "Preparing Food",
                "orderDate": "2024-01-01T09:15:00",
                "deliveredAt": null,
                "deliveryAddress": "12 Baker Street",
                "totalAmount": 450.5,
                "items": [
                    {"id": 7, "menuItemName": "Veg Biryani", "quantity": 2, "pricePerItem": 180.0},
                    {"id": 8, "menuItemName": null, "quantity": 1, "pricePerItem": 90.5}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(order.id, OrderId::from("42"));
        assert_eq!(order.status, "Preparing Food");
        assert_eq!(
            order.order_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap())
        );
        assert_eq!(order.delivered_at, None);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].line_total(), 360.0);
        assert_eq!(order.items[1].display_name(), "Item not available");
    }

    #[test]
    fn test_missing_id_or_status_is_malformed() {
        assert_eq!(
            decode(r#"{"status": "Delivered"}"#),
            Err(ShapeError::MissingField("id"))
        );
        assert_eq!(
            decode(r#"{"id": "", "status": "Delivered"}"#),
            Err(ShapeError::MissingField("id"))
        );
        assert_eq!(
            decode(r#"{"id": "9"}"#),
            Err(ShapeError::MissingField("status"))
        );
        assert!(matches!(
            decode(r#"{"id": [1], "status": "Delivered"}"#),
            Err(ShapeError::InvalidId(_))
        ));
    }

    #[test]
    fn test_rejects_bad_amounts_and_quantities() {
        assert!(matches!(
            decode(r#"{"id": 1, "status": "Order Placed", "totalAmount": -1.0}"#),
            Err(ShapeError::Amount { field: "totalAmount", .. })
        ));
        assert_eq!(
            decode(r#"{"id": 1, "status": "Order Placed", "items": [{"quantity": 0, "pricePerItem": 1.0}]}"#),
            Err(ShapeError::Quantity(0))
        );
        assert!(matches!(
            decode(r#"{"id": 1, "status": "Order Placed", "items": [{"quantity": 1, "pricePerItem": -3.0}]}"#),
            Err(ShapeError::Amount { field: "pricePerItem", .. })
        ));
    }

    #[test]
    fn test_timestamps() {
        let order = decode(
            r#"{"id": "a", "status": "Delivered", "deliveredAt": "2024-01-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            order.delivered_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );
        assert!(order.is_delivered());

        assert!(matches!(
            decode(r#"{"id": "a", "status": "Delivered", "orderDate": "yesterday"}"#),
            Err(ShapeError::Timestamp { field: "orderDate", .. })
        ));
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let order = decode(r#"{"id": "5", "status": "Order Placed"}"#).unwrap();
        assert_eq!(order, Order::new("5", "Order Placed"));
        assert!(!order.is_delivered());
    }
}
