//! Pure data structures: order snapshots, identities and the stage vocabulary.

pub mod order;
pub mod stage;

pub use order::*;
pub use stage::*;
