//! # Order History
//!
//! The "My Orders" list: every order an identity has placed, sorted by order date,
//! with the in-flight ones flagged as trackable.

use crate::clients::{OrderQuery, QueryError};
use crate::model::{Identity, Order, Stage};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur while loading the order history.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HistoryError {
    /// There is no signed-in identity to load orders for.
    #[error("Sign in to see your orders")]
    SignedOut,

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Direction of the order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::NewestFirst => SortOrder::OldestFirst,
            SortOrder::OldestFirst => SortOrder::NewestFirst,
        }
    }

    /// Sorts by order date. Orders without a date count as the oldest.
    pub fn sort(self, orders: &mut [Order]) {
        orders.sort_by(|a, b| {
            let oldest_first = a.order_date.cmp(&b.order_date);
            match self {
                SortOrder::OldestFirst => oldest_first,
                SortOrder::NewestFirst => oldest_first.reverse(),
            }
        });
    }
}

/// Whether the list should offer tracking for this order.
pub fn is_trackable(order: &Order) -> bool {
    Stage::from_status(&order.status) != Some(Stage::Delivered)
}

/// Loads and sorts every order of the signed-in identity.
#[instrument(skip(query, identity), fields(user_id = ?identity.map(|i| &i.user_id)))]
pub async fn load(
    query: &dyn OrderQuery,
    identity: Option<&Identity>,
    sort: SortOrder,
) -> Result<Vec<Order>, HistoryError> {
    let identity = identity.ok_or(HistoryError::SignedOut)?;
    let mut orders = query.orders_for_user(&identity.user_id).await?;
    sort.sort(&mut orders);
    debug!(count = orders.len(), ?sort, "Order history loaded");
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::{create_mock_query, expect_orders_for_user, MockOrderQuery};
    use crate::model::UserId;
    use chrono::{TimeZone, Utc};

    fn placed_on(id: &str, day: u32) -> Order {
        Order {
            order_date: Some(Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()),
            ..Order::new(id, "Order Placed")
        }
    }

    fn ids(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.id.0.as_str()).collect()
    }

    #[test]
    fn test_sorts_both_ways() {
        let mut orders = vec![
            placed_on("b", 2),
            Order::new("undated", "Delivered"),
            placed_on("c", 3),
            placed_on("a", 1),
        ];

        SortOrder::NewestFirst.sort(&mut orders);
        assert_eq!(ids(&orders), ["c", "b", "a", "undated"]);

        SortOrder::NewestFirst.toggle().sort(&mut orders);
        assert_eq!(ids(&orders), ["undated", "a", "b", "c"]);
    }

    #[test]
    fn test_only_undelivered_orders_are_trackable() {
        assert!(is_trackable(&Order::new("1", "Out for Delivery")));
        assert!(is_trackable(&Order::new("1", "Something new")));
        assert!(!is_trackable(&Order::new("1", "Delivered")));
    }

    #[tokio::test]
    async fn test_load_requires_identity() {
        let mock = MockOrderQuery::new();
        let result = load(&mock.query(), None, SortOrder::default()).await;
        assert_eq!(result, Err(HistoryError::SignedOut));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_sorts_and_propagates_errors() {
        let mut mock = MockOrderQuery::new();
        mock.expect_orders_for_user(UserId::from("7"))
            .return_ok(vec![placed_on("old", 1), placed_on("new", 9)]);
        mock.expect_orders_for_user(UserId::from("7"))
            .return_err(QueryError::Status(500));

        let identity = Identity::new("7", "Asha");
        let orders = load(&mock.query(), Some(&identity), SortOrder::NewestFirst)
            .await
            .unwrap();
        assert_eq!(ids(&orders), ["new", "old"]);

        let failed = load(&mock.query(), Some(&identity), SortOrder::NewestFirst).await;
        assert_eq!(failed, Err(HistoryError::Query(QueryError::Status(500))));
        mock.verify();
    }

    #[tokio::test]
    async fn test_load_asks_for_the_signed_in_user() {
        let (query, mut requests) = create_mock_query(4);
        let identity = Identity::new("7", "Asha");

        let loading = tokio::spawn(async move {
            load(&query, Some(&identity), SortOrder::OldestFirst).await
        });

        let (user_id, responder) = expect_orders_for_user(&mut requests)
            .await
            .expect("Expected OrdersForUser request");
        assert_eq!(user_id, UserId::from("7"));
        responder
            .send(Ok(vec![placed_on("new", 9), placed_on("old", 1)]))
            .unwrap();

        let orders = loading.await.unwrap().unwrap();
        assert_eq!(ids(&orders), ["old", "new"]);
    }
}
