//! # Mock Order Query Service
//!
//! [`MockOrderQuery`] plays the backend for tests. It hands out a [`ChannelQuery`] that
//! implements [`OrderQuery`](crate::clients::OrderQuery) exactly like the production
//! client, and answers each request from a queue of scripted expectations.
//!
//! ## When to use which helper
//!
//! | Helper | Use Case |
//! |--------|----------|
//! | [`MockOrderQuery`] | Scripted responses (optionally delayed), call log, `verify()` |
//! | [`create_mock_query`] + [`expect_fetch`] | Hand-driven responders: hold a fetch open, complete fetches out of order |
//!
//! ## Example
//!
//! ```rust
//! use order_tracking::clients::mock::MockOrderQuery;
//! use order_tracking::clients::{OrderQuery, QueryError, TrackTarget};
//! use order_tracking::model::{Order, OrderId};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockOrderQuery::new();
//!     mock.expect_order(OrderId::from("42"))
//!         .return_ok(Order::new("42", "Preparing Food"));
//!     mock.expect_order(OrderId::from("42"))
//!         .return_err(QueryError::Transport("connection reset".into()));
//!
//!     let query = mock.query();
//!     let order = query.order_by_id(&OrderId::from("42")).await.unwrap();
//!     assert_eq!(order.status, "Preparing Food");
//!     assert!(query.order_by_id(&OrderId::from("42")).await.is_err());
//!
//!     mock.verify();
//! }
//! ```
//!
//! Once the script runs out, further requests are still recorded and answered with a
//! transport error, so a tracker can keep polling past the end of a script.

use crate::clients::channel_client::{ChannelQuery, QueryRequest, Responder};
use crate::clients::{QueryError, TrackTarget};
use crate::model::{Order, OrderId, UserId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

struct Scripted<T> {
    delay: Option<Duration>,
    result: Result<T, QueryError>,
}

impl<T: Send + 'static> Scripted<T> {
    fn unscripted() -> Self {
        Self {
            delay: None,
            result: Err(QueryError::Transport("no response scripted".to_string())),
        }
    }

    fn send(self, respond_to: Responder<T>) {
        match self.delay {
            Some(delay) => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = respond_to.send(self.result);
                });
            }
            None => {
                let _ = respond_to.send(self.result);
            }
        }
    }
}

enum Expectation {
    Fetch {
        target: TrackTarget,
        response: Scripted<Order>,
    },
    OrdersForUser {
        user_id: UserId,
        response: Scripted<Vec<Order>>,
    },
}

/// A request the mock has received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Fetch(TrackTarget),
    OrdersForUser(UserId),
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    calls: Vec<RecordedCall>,
    mismatches: Vec<String>,
}

/// A scripted backend with expectation tracking.
pub struct MockOrderQuery {
    query: ChannelQuery,
    state: Arc<Mutex<MockState>>,
    call_count: watch::Receiver<usize>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for MockOrderQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOrderQuery {
    /// Creates a mock with an empty script. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<QueryRequest>(100);
        let state = Arc::new(Mutex::new(MockState::default()));
        let (count_tx, call_count) = watch::channel(0usize);
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = task_state.lock().unwrap().expectations.pop_front();

                match request {
                    QueryRequest::Fetch { target, respond_to } => {
                        let response = match next {
                            Some(Expectation::Fetch {
                                target: expected,
                                response,
                            }) => {
                                if expected != target {
                                    task_state.lock().unwrap().mismatches.push(format!(
                                        "expected fetch of {expected}, got {target}"
                                    ));
                                }
                                response
                            }
                            other => {
                                note_unexpected(&task_state, other, &target.to_string());
                                Scripted::unscripted()
                            }
                        };
                        record(&task_state, &count_tx, RecordedCall::Fetch(target));
                        response.send(respond_to);
                    }
                    QueryRequest::OrdersForUser {
                        user_id,
                        respond_to,
                    } => {
                        let response = match next {
                            Some(Expectation::OrdersForUser {
                                user_id: expected,
                                response,
                            }) => {
                                if expected != user_id {
                                    task_state.lock().unwrap().mismatches.push(format!(
                                        "expected orders of user {expected}, got {user_id}"
                                    ));
                                }
                                response
                            }
                            other => {
                                note_unexpected(
                                    &task_state,
                                    other,
                                    &format!("orders of user {user_id}"),
                                );
                                Scripted::unscripted()
                            }
                        };
                        record(&task_state, &count_tx, RecordedCall::OrdersForUser(user_id));
                        response.send(respond_to);
                    }
                }
            }
        });

        Self {
            query: ChannelQuery::new(sender),
            state,
            call_count,
            _handle: handle,
        }
    }

    /// Returns the query client for use in tests.
    pub fn query(&self) -> ChannelQuery {
        self.query.clone()
    }

    /// Expects `GET /orders/{id}`.
    pub fn expect_order(&mut self, id: OrderId) -> FetchExpectationBuilder {
        self.expect_fetch(TrackTarget::Order(id))
    }

    /// Expects `GET /orders/user/{userId}/latest-active`.
    pub fn expect_latest_active(&mut self, user_id: UserId) -> FetchExpectationBuilder {
        self.expect_fetch(TrackTarget::LatestActive(user_id))
    }

    /// Expects a fetch of the given target.
    pub fn expect_fetch(&mut self, target: TrackTarget) -> FetchExpectationBuilder {
        FetchExpectationBuilder {
            target,
            delay: None,
            state: self.state.clone(),
        }
    }

    /// Expects `GET /orders/user/{userId}`.
    pub fn expect_orders_for_user(&mut self, user_id: UserId) -> OrdersExpectationBuilder {
        OrdersExpectationBuilder {
            user_id,
            delay: None,
            state: self.state.clone(),
        }
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Targets of every fetch received so far.
    pub fn fetch_targets(&self) -> Vec<TrackTarget> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Fetch(target) => Some(target),
                RecordedCall::OrdersForUser(_) => None,
            })
            .collect()
    }

    /// Waits until at least `n` requests have been received.
    pub async fn wait_for_calls(&self, n: usize) {
        let mut count = self.call_count.clone();
        let _ = count.wait_for(|received| *received >= n).await;
    }

    /// Verifies that the whole script was consumed and every request matched it.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.mismatches.is_empty() {
            panic!("Unexpected requests: {:?}", state.mismatches);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

fn record(state: &Mutex<MockState>, count: &watch::Sender<usize>, call: RecordedCall) {
    let received = {
        let mut state = state.lock().unwrap();
        state.calls.push(call);
        state.calls.len()
    };
    count.send_replace(received);
}

fn note_unexpected(state: &Mutex<MockState>, expected: Option<Expectation>, got: &str) {
    if let Some(expected) = expected {
        let expected = match expected {
            Expectation::Fetch { target, .. } => format!("fetch of {target}"),
            Expectation::OrdersForUser { user_id, .. } => format!("orders of user {user_id}"),
        };
        state
            .lock()
            .unwrap()
            .mismatches
            .push(format!("expected {expected}, got {got}"));
    }
}

/// Builder for fetch expectations.
pub struct FetchExpectationBuilder {
    target: TrackTarget,
    delay: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl FetchExpectationBuilder {
    /// Holds the response back for `delay` without blocking later requests.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a snapshot.
    pub fn return_ok(self, order: Order) {
        self.push(Ok(order));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: QueryError) {
        self.push(Err(error));
    }

    fn push(self, result: Result<Order, QueryError>) {
        self.state
            .lock()
            .unwrap()
            .expectations
            .push_back(Expectation::Fetch {
                target: self.target,
                response: Scripted {
                    delay: self.delay,
                    result,
                },
            });
    }
}

/// Builder for order-list expectations.
pub struct OrdersExpectationBuilder {
    user_id: UserId,
    delay: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl OrdersExpectationBuilder {
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn return_ok(self, orders: Vec<Order>) {
        self.push(Ok(orders));
    }

    pub fn return_err(self, error: QueryError) {
        self.push(Err(error));
    }

    fn push(self, result: Result<Vec<Order>, QueryError>) {
        self.state
            .lock()
            .unwrap()
            .expectations
            .push_back(Expectation::OrdersForUser {
                user_id: self.user_id,
                response: Scripted {
                    delay: self.delay,
                    result,
                },
            });
    }
}

// =============================================================================
// HAND-DRIVEN HELPERS
// =============================================================================

/// Creates a query client and the receiver its requests arrive on.
///
/// Nothing answers on its own: the test pulls each request with [`expect_fetch`] and
/// decides when (and whether) to complete it through the returned responder.
pub fn create_mock_query(buffer_size: usize) -> (ChannelQuery, mpsc::Receiver<QueryRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelQuery::new(sender), receiver)
}

/// Waits for the next request and returns it if it is a fetch.
pub async fn expect_fetch(
    receiver: &mut mpsc::Receiver<QueryRequest>,
) -> Option<(TrackTarget, Responder<Order>)> {
    match receiver.recv().await {
        Some(QueryRequest::Fetch { target, respond_to }) => Some((target, respond_to)),
        _ => None,
    }
}

/// Waits for the next request and returns it if it is an order-list request.
pub async fn expect_orders_for_user(
    receiver: &mut mpsc::Receiver<QueryRequest>,
) -> Option<(UserId, Responder<Vec<Order>>)> {
    match receiver.recv().await {
        Some(QueryRequest::OrdersForUser {
            user_id,
            respond_to,
        }) => Some((user_id, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::OrderQuery;

    #[tokio::test]
    async fn test_hand_driven_fetch() {
        let (query, mut receiver) = create_mock_query(10);

        let fetch_task =
            tokio::spawn(async move { query.order_by_id(&OrderId::from("42")).await });

        let (target, responder) = expect_fetch(&mut receiver)
            .await
            .expect("Expected Fetch request");
        assert_eq!(target, TrackTarget::Order(OrderId::from("42")));
        responder.send(Ok(Order::new("42", "Order Placed"))).unwrap();

        let order = fetch_task.await.unwrap().unwrap();
        assert_eq!(order.status, "Order Placed");
    }

    #[tokio::test]
    async fn test_mock_with_expectations() {
        let mut mock = MockOrderQuery::new();
        mock.expect_latest_active(UserId::from("7"))
            .return_ok(Order::new("3", "Order Accepted"));
        mock.expect_orders_for_user(UserId::from("7"))
            .return_ok(vec![Order::new("3", "Order Accepted")]);

        let query = mock.query();
        let order = query.latest_active(&UserId::from("7")).await.unwrap();
        assert_eq!(order.id, OrderId::from("3"));

        let orders = query.orders_for_user(&UserId::from("7")).await.unwrap();
        assert_eq!(orders.len(), 1);

        mock.verify();
        assert_eq!(
            mock.calls(),
            vec![
                RecordedCall::Fetch(TrackTarget::LatestActive(UserId::from("7"))),
                RecordedCall::OrdersForUser(UserId::from("7")),
            ]
        );
    }

    #[tokio::test]
    async fn test_unscripted_requests_fail_without_mismatch() {
        let mock = MockOrderQuery::new();
        let result = mock.query().order_by_id(&OrderId::from("1")).await;
        assert!(matches!(result, Err(QueryError::Transport(_))));
        assert_eq!(mock.fetch_targets().len(), 1);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected requests")]
    async fn test_verify_reports_wrong_target() {
        let mut mock = MockOrderQuery::new();
        mock.expect_order(OrderId::from("1"))
            .return_ok(Order::new("1", "Delivered"));

        let _ = mock.query().order_by_id(&OrderId::from("2")).await;
        mock.verify();
    }
}
