//! # OrderQuery Trait
//!
//! The seam between the tracker and the backend order API. The tracker only ever reads
//! through this trait, so the HTTP client, the channel client and the test mocks are
//! interchangeable.

use crate::clients::QueryError;
use crate::model::{Identity, Order, OrderId, UserId};
use async_trait::async_trait;
use std::fmt::Display;

/// What a tracker polls for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackTarget {
    /// `GET /orders/{orderId}`
    Order(OrderId),
    /// `GET /orders/user/{userId}/latest-active`
    LatestActive(UserId),
}

impl TrackTarget {
    /// An explicit order id wins; otherwise fall back to the identity's latest active
    /// order. With neither there is nothing to poll.
    pub fn resolve(order_id: Option<OrderId>, identity: Option<&Identity>) -> Option<Self> {
        match (order_id, identity) {
            (Some(id), _) => Some(TrackTarget::Order(id)),
            (None, Some(identity)) => Some(TrackTarget::LatestActive(identity.user_id.clone())),
            (None, None) => None,
        }
    }

    /// Path segments below the API base URL.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            TrackTarget::Order(id) => vec!["orders", id.0.as_str()],
            TrackTarget::LatestActive(user) => {
                vec!["orders", "user", user.0.as_str(), "latest-active"]
            }
        }
    }
}

impl Display for TrackTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.segments().join("/"))
    }
}

/// Read-only access to the backend order API.
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// Fetch the current snapshot for a tracking target.
    async fn fetch(&self, target: &TrackTarget) -> Result<Order, QueryError>;

    /// Fetch every order placed by a user (`GET /orders/user/{userId}`).
    async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, QueryError>;

    /// Fetch an order by id.
    #[tracing::instrument(skip(self))]
    async fn order_by_id(&self, id: &OrderId) -> Result<Order, QueryError> {
        tracing::debug!("Sending request");
        self.fetch(&TrackTarget::Order(id.clone())).await
    }

    /// Fetch the user's latest order that has not been delivered yet.
    #[tracing::instrument(skip(self))]
    async fn latest_active(&self, user_id: &UserId) -> Result<Order, QueryError> {
        tracing::debug!("Sending request");
        self.fetch(&TrackTarget::LatestActive(user_id.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_order_id_wins() {
        let identity = Identity::new("7", "Asha");
        assert_eq!(
            TrackTarget::resolve(Some(OrderId::from("42")), Some(&identity)),
            Some(TrackTarget::Order(OrderId::from("42")))
        );
        assert_eq!(
            TrackTarget::resolve(None, Some(&identity)),
            Some(TrackTarget::LatestActive(UserId::from("7")))
        );
        assert_eq!(TrackTarget::resolve(None, None), None);
    }

    #[test]
    fn test_paths() {
        assert_eq!(TrackTarget::Order(OrderId::from("42")).to_string(), "/orders/42");
        assert_eq!(
            TrackTarget::LatestActive(UserId::from("7")).to_string(),
            "/orders/user/7/latest-active"
        );
    }
}
