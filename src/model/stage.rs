//! # Stage Vocabulary
//!
//! The five delivery stages an order moves through, in order. The backend reports a
//! free-form `status` string; the tracker maps it onto this vocabulary by exact match.
//! A status outside the vocabulary is not an error: no stage is marked completed and
//! the full list renders as pending.

use crate::model::Order;
use std::fmt::Display;

/// One step in the delivery progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Placed,
    Accepted,
    Preparing,
    OutForDelivery,
    Delivered,
}

impl Stage {
    /// Every stage, in progression order.
    pub const ALL: [Stage; 5] = [
        Stage::Placed,
        Stage::Accepted,
        Stage::Preparing,
        Stage::OutForDelivery,
        Stage::Delivered,
    ];

    /// The status string the backend uses for this stage.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Placed => "Order Placed",
            Stage::Accepted => "Order Accepted",
            Stage::Preparing => "Preparing Food",
            Stage::OutForDelivery => "Out for Delivery",
            Stage::Delivered => "Delivered",
        }
    }

    /// Position of this stage in [`Stage::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Exact, case-sensitive lookup of a backend status.
    pub fn from_status(status: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.label() == status)
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Delivered
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a stage has been reached yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Pending,
}

/// Progress derived from a single order snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageProgress {
    current: Option<Stage>,
}

impl StageProgress {
    pub fn derive(order: &Order) -> Self {
        Self::from_status(&order.status)
    }

    pub fn from_status(status: &str) -> Self {
        Self {
            current: Stage::from_status(status),
        }
    }

    /// The stage the order is in, or `None` for a status outside the vocabulary.
    pub fn current(&self) -> Option<Stage> {
        self.current
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current.map(Stage::index)
    }

    /// Stages up to and including the current one are completed.
    pub fn is_completed(&self, stage: Stage) -> bool {
        self.current.is_some_and(|current| stage <= current)
    }

    pub fn state_of(&self, stage: Stage) -> StepState {
        if self.is_completed(stage) {
            StepState::Completed
        } else {
            StepState::Pending
        }
    }

    /// All five stages with their state, in progression order.
    pub fn steps(&self) -> impl Iterator<Item = (Stage, StepState)> + '_ {
        Stage::ALL
            .into_iter()
            .map(move |stage| (stage, self.state_of(stage)))
    }

    pub fn completed_count(&self) -> usize {
        self.current_index().map_or(0, |i| i + 1)
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_some_and(Stage::is_terminal)
    }
}
