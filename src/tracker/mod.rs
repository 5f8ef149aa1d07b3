//! The polling engine behind order tracking.
//!
//! - [`OrderTracker`] - start/stop lifecycle and the poll loop
//! - [`TrackingState`] - what the consumer renders
//! - [`PollConfig`] / [`RetryPolicy`] - cadence and failure handling

pub mod core;
pub mod schedule;
pub mod state;

pub use self::core::*;
pub use schedule::*;
pub use state::*;
