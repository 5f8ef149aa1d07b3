#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Order Tracking
//!
//! > **Client-side order status tracking for a food-ordering service.**
//!
//! Given an order id (or, without one, the signed-in user's latest active order), this
//! crate polls the backend order API, maps the reported status onto a fixed sequence of
//! delivery stages, and publishes the result to whatever view is showing it.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### An explicit polling task
//!
//! Tracking is a task object owned by the view, with an explicit start/stop lifecycle.
//! Nothing depends on a UI framework's lifecycle hooks: a view starts an
//! [`OrderTracker`](tracker::OrderTracker) when it opens and drops (or stops) it when it
//! closes.
//!
//! ### Never show stale data
//!
//! - A failed poll replaces the previous snapshot with "no order" instead of keeping it.
//! - Each fetch carries an issue sequence number; a response that arrives after a fresher
//!   one has been applied is discarded.
//! - After `stop()` returns, nothing is fetched and nothing is applied.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Each layer defines its own error enum with `thiserror`: [`QueryError`](clients::QueryError)
//! for the order API, [`HistoryError`](history::HistoryError) for the order list,
//! [`ConfigError`](lifecycle::ConfigError) for configuration.
//!
//! ### 2. Concurrency Model
//! The poll loop runs in its own Tokio task and spawns one task per fetch. The only
//! shared mutable state is a small gate (active flag, issue/apply sequence numbers)
//! behind a mutex; snapshots are published through a `tokio::sync::watch` channel, so
//! every update replaces the whole state at once.
//!
//! ### 3. Observability
//! We use `tracing` everywhere with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`])
//! - **Role**: Order snapshots, payload validation and the stage vocabulary.
//! - **Key items**: [`Order`](model::Order), [`Stage`](model::Stage), [`StageProgress`](model::StageProgress).
//!
//! ### 2. The Interface ([`clients`])
//! - **Role**: The read-only seam to the backend order API.
//! - **Key items**: [`OrderQuery`](clients::OrderQuery), [`HttpOrderQuery`](clients::HttpOrderQuery),
//!   [`MockOrderQuery`](clients::mock::MockOrderQuery).
//!
//! ### 3. The Engine ([`tracker`])
//! - **Role**: Polling, ordering, cancellation and the consumer-facing state.
//! - **Key items**: [`OrderTracker`](tracker::OrderTracker), [`TrackingState`](tracker::TrackingState).
//!
//! ### 4. The Order List ([`history`])
//! - **Role**: A user's orders, sorted, with the undelivered ones marked trackable.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! - **Role**: Configuration, tracing setup, and wiring the HTTP client into trackers.
//! - **Key items**: [`TrackingSystem`](lifecycle::TrackingSystem), [`TrackerConfig`](lifecycle::TrackerConfig).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Track order 42 against a local backend
//! RUST_LOG=info cargo run -- --order 42
//!
//! # Run the tests
//! cargo test
//! ```

pub mod clients;
pub mod history;
pub mod lifecycle;
pub mod model;
pub mod tracker;
