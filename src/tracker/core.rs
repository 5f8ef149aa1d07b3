//! # Order Tracker
//!
//! A polling task owned by the view that shows an order's progress.
//!
//! ## Lifecycle
//!
//! [`OrderTracker::start`] spawns the poll loop and returns the tracker, which is the
//! cancellation handle. The first fetch is issued immediately; after that one fetch per
//! interval. [`OrderTracker::stop`] (also run on drop) ends the session.
//!
//! ## Ordering and cancellation
//!
//! Fetches run as independent tasks, so a slow response can overlap the next cycle.
//! Each fetch is tagged with a sequence number when it is issued. All bookkeeping lives
//! behind one gate:
//!
//! - a fetch is only issued while the gate is active;
//! - a completion is only applied while the gate is active and only if its sequence is
//!   newer than the last applied one, so a late response never overwrites a fresher one;
//! - `stop()` closes the gate, so nothing is issued or applied once it returns.
//!
//! Closing the gate also drops the state publisher. Receivers from
//! [`OrderTracker::subscribe`] keep the last published state, and `changed()` then
//! returns an error, which is how a consumer learns that the session is over.
//!
//! In-flight requests are not aborted at the transport level; their results are
//! dropped when they reach the closed gate.

use crate::clients::{OrderQuery, QueryError, TrackTarget};
use crate::model::Order;
use crate::tracker::{PollConfig, TrackedOrder, TrackingState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct Gate {
    active: bool,
    /// Sequence number of the most recently issued fetch.
    issued: u64,
    /// Sequence number of the most recently applied completion.
    applied: u64,
    consecutive_failures: u32,
    /// Dropped when the gate closes.
    publisher: Option<watch::Sender<TrackingState>>,
}

impl Gate {
    fn close(&mut self) -> bool {
        self.publisher = None;
        std::mem::replace(&mut self.active, false)
    }
}

/// State shared between the tracker handle, the poll loop and the fetch tasks.
struct Shared {
    gate: Mutex<Gate>,
    latest: watch::Receiver<TrackingState>,
    stop_on_delivered: bool,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Applied,
    Stale,
    Stopped,
}

impl Shared {
    fn new(active: bool, initial: TrackingState, stop_on_delivered: bool) -> Self {
        let (publisher, latest) = watch::channel(initial);
        Self {
            gate: Mutex::new(Gate {
                active,
                issued: 0,
                applied: 0,
                consecutive_failures: 0,
                publisher: active.then_some(publisher),
            }),
            latest,
            stop_on_delivered,
        }
    }

    fn gate(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_active(&self) -> bool {
        self.gate().active
    }

    /// Reserves the next sequence number and hands it to `spawn` while the gate is
    /// held. Returns `false` once the tracker has stopped.
    fn issue(&self, spawn: impl FnOnce(u64)) -> bool {
        let mut gate = self.gate();
        if !gate.active {
            return false;
        }
        gate.issued += 1;
        spawn(gate.issued);
        true
    }

    fn consecutive_failures(&self) -> u32 {
        self.gate().consecutive_failures
    }

    fn apply(&self, seq: u64, result: Result<Order, QueryError>) -> Outcome {
        let mut gate = self.gate();
        if !gate.active {
            return Outcome::Stopped;
        }
        if seq <= gate.applied {
            return Outcome::Stale;
        }
        gate.applied = seq;

        let next = match result {
            Ok(order) => {
                gate.consecutive_failures = 0;
                let tracked = TrackedOrder::new(order);
                debug!(
                    seq,
                    order_id = %tracked.order().id,
                    status = %tracked.order().status,
                    stage = ?tracked.progress().current_index(),
                    "Snapshot applied"
                );
                TrackingState::Tracking(tracked)
            }
            Err(e) => {
                gate.consecutive_failures = gate.consecutive_failures.saturating_add(1);
                warn!(seq, error = %e, failures = gate.consecutive_failures, "Poll failed");
                TrackingState::NoOrder
            }
        };
        let delivered = next.order().is_some_and(Order::is_delivered);
        if let Some(publisher) = &gate.publisher {
            publisher.send_replace(next);
        }
        if self.stop_on_delivered && delivered {
            gate.close();
            info!(seq, "Order delivered, tracking stopped");
        }
        Outcome::Applied
    }
}

/// Handle to a running tracking session.
pub struct OrderTracker {
    shared: Arc<Shared>,
    target: Option<TrackTarget>,
    handle: Option<JoinHandle<()>>,
}

impl OrderTracker {
    /// Starts polling `target`. Must be called inside a Tokio runtime.
    ///
    /// Without a target nothing is ever fetched and the tracker reports
    /// [`TrackingState::NoOrder`] straight away.
    pub fn start(
        query: Arc<dyn OrderQuery>,
        target: Option<TrackTarget>,
        config: PollConfig,
    ) -> Self {
        let Some(target) = target else {
            info!("No order id or identity, nothing to track");
            return Self::idle();
        };

        let shared = Arc::new(Shared::new(
            true,
            TrackingState::Loading,
            config.stop_on_delivered,
        ));
        info!(
            endpoint = %target,
            interval_ms = config.interval.as_millis() as u64,
            stop_on_delivered = config.stop_on_delivered,
            "Tracking started"
        );
        let handle = tokio::spawn(poll_loop(shared.clone(), query, target.clone(), config));

        Self {
            shared,
            target: Some(target),
            handle: Some(handle),
        }
    }

    /// A tracker with nothing to track.
    pub fn idle() -> Self {
        Self {
            shared: Arc::new(Shared::new(false, TrackingState::NoOrder, false)),
            target: None,
            handle: None,
        }
    }

    /// Stops polling. Idempotent; nothing is fetched or applied after this returns.
    ///
    /// Subscribers see `changed()` fail from here on.
    pub fn stop(&self) {
        let was_active = self.shared.gate().close();
        if let Some(handle) = &self.handle {
            handle.abort();
        }
        if was_active {
            info!(endpoint = ?self.target, "Tracking stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.is_active()
    }

    pub fn target(&self) -> Option<&TrackTarget> {
        self.target.as_ref()
    }

    /// The state as of the latest applied poll.
    pub fn state(&self) -> TrackingState {
        self.shared.latest.borrow().clone()
    }

    /// A receiver that observes every state the tracker publishes from now on.
    ///
    /// Once the tracker stops, `changed()` on the receiver returns an error and
    /// `borrow()` keeps the last published state.
    pub fn subscribe(&self) -> watch::Receiver<TrackingState> {
        let mut updates = self.shared.latest.clone();
        updates.borrow_and_update();
        updates
    }
}

impl Drop for OrderTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    shared: Arc<Shared>,
    query: Arc<dyn OrderQuery>,
    target: TrackTarget,
    config: PollConfig,
) {
    loop {
        let cycle_start = Instant::now();
        let issued = shared.issue(|seq| {
            debug!(seq, endpoint = %target, "Poll issued");
            tokio::spawn(fetch(shared.clone(), query.clone(), target.clone(), seq));
        });
        if !issued {
            break;
        }

        let delay = config
            .retry
            .next_delay(config.interval, shared.consecutive_failures());
        tokio::time::sleep_until(cycle_start + delay).await;
    }
    debug!(endpoint = %target, "Poll loop finished");
}

async fn fetch(shared: Arc<Shared>, query: Arc<dyn OrderQuery>, target: TrackTarget, seq: u64) {
    if !shared.is_active() {
        return;
    }
    let result = query.fetch(&target).await;
    match shared.apply(seq, result) {
        Outcome::Applied => {}
        Outcome::Stale => debug!(seq, "Stale result discarded"),
        Outcome::Stopped => debug!(seq, "Tracker stopped, result discarded"),
    }
}
