//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter driven by
//! `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Tracker lifecycle** (`info`): start, stop, auto-stop on delivery
//! - **Poll cycles** (`debug`): issue and apply, with `seq`, `status` and `stage` fields
//! - **Failures** (`warn`): failed polls with the error and the consecutive failure count
//! - **Client calls** (`debug`): one span per request, named after the client method
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle and failures only
//! RUST_LOG=info cargo run -- --order 42
//!
//! # Every poll cycle
//! RUST_LOG=debug cargo run -- --order 42
//!
//! # Only the polling engine
//! RUST_LOG=order_tracking::tracker=debug cargo run -- --order 42
//! ```
//!
//! With `RUST_LOG=debug` a tracking session reads like:
//!
//! ```text
//! INFO Tracking started endpoint=/orders/42 interval_ms=1000 stop_on_delivered=false
//! DEBUG Poll issued seq=1 endpoint=/orders/42
//! DEBUG Snapshot applied seq=1 order_id=42 status=Preparing Food stage=Some(2)
//! DEBUG Poll issued seq=2 endpoint=/orders/42
//! WARN Poll failed seq=2 error=Transport error: connection refused failures=1
//! INFO Tracking stopped endpoint=Some(Order(OrderId("42")))
//! ```

/// Initializes the global subscriber. Call once, at the start of `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
