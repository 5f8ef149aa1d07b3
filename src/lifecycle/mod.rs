//! # Configuration, Observability & Orchestration
//!
//! - [`TrackerConfig`] - settings read from the environment
//! - [`setup_tracing`] - structured logging for the whole process
//! - [`TrackingSystem`] - builds the order API client and hands out trackers

pub mod config;
pub mod tracing;
pub mod tracking_system;

pub use config::*;
pub use self::tracing::*;
pub use tracking_system::*;
