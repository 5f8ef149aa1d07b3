use crate::clients::{HttpOrderQuery, OrderQuery, QueryError, TrackTarget};
use crate::history::{self, HistoryError, SortOrder};
use crate::lifecycle::TrackerConfig;
use crate::model::{Identity, Order, OrderId};
use crate::tracker::OrderTracker;
use std::sync::Arc;
use tracing::info;

/// Wires the order API client into trackers and the order history.
///
/// Views ask the system for an [`OrderTracker`] when they open and own it until they
/// close; dropping the tracker stops it.
///
/// # Example
///
/// ```no_run
/// use order_tracking::lifecycle::{TrackerConfig, TrackingSystem};
/// use order_tracking::model::OrderId;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let system = TrackingSystem::new(TrackerConfig::load()?)?;
///     let tracker = system.track(Some(OrderId::from("42")), None);
///     let mut updates = tracker.subscribe();
///     updates.changed().await?;
///     println!("{}", *updates.borrow());
///     tracker.stop();
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct TrackingSystem {
    query: Arc<dyn OrderQuery>,
    config: TrackerConfig,
}

impl TrackingSystem {
    /// Connects to the order API described by `config`.
    pub fn new(config: TrackerConfig) -> Result<Self, QueryError> {
        let query = HttpOrderQuery::new(&config.api_url, config.request_timeout)?;
        info!(api_url = %query.base_url(), "Order API client ready");
        Ok(Self::with_query(Arc::new(query), config))
    }

    /// Uses an existing query implementation (a mock, a channel bridge).
    pub fn with_query(query: Arc<dyn OrderQuery>, config: TrackerConfig) -> Self {
        Self { query, config }
    }

    pub fn query(&self) -> Arc<dyn OrderQuery> {
        self.query.clone()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Opens a tracking session for an explicit order, or for the identity's latest
    /// active order when no id is given.
    pub fn track(&self, order_id: Option<OrderId>, identity: Option<&Identity>) -> OrderTracker {
        let target = TrackTarget::resolve(order_id, identity);
        OrderTracker::start(self.query.clone(), target, self.config.poll.clone())
    }

    /// Loads the identity's orders for the "My Orders" list.
    pub async fn order_history(
        &self,
        identity: Option<&Identity>,
        sort: SortOrder,
    ) -> Result<Vec<Order>, HistoryError> {
        history::load(self.query.as_ref(), identity, sort).await
    }
}
