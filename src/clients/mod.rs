//! The Order Query Service seam and its implementations.

pub mod channel_client;
pub mod error;
pub mod http_client;
pub mod mock;
pub mod query;

pub use channel_client::*;
pub use error::*;
pub use http_client::*;
pub use query::*;
