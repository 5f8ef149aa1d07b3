//! What the tracker exposes to its consumer.
//!
//! Every poll publishes a whole new [`TrackingState`]; a consumer never sees fields of
//! two different snapshots mixed together.

use crate::model::{Order, StageProgress, StepState};
use chrono::{DateTime, Utc};
use std::fmt::{self, Display};
use std::sync::Arc;

/// An order snapshot together with the progress derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedOrder {
    order: Arc<Order>,
    progress: StageProgress,
}

impl TrackedOrder {
    pub fn new(order: Order) -> Self {
        let progress = StageProgress::derive(&order);
        Self {
            order: Arc::new(order),
            progress,
        }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn progress(&self) -> StageProgress {
        self.progress
    }
}

/// State as of the latest applied poll.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TrackingState {
    /// Nothing has completed yet.
    #[default]
    Loading,
    /// No target, or the latest poll failed.
    NoOrder,
    Tracking(TrackedOrder),
}

impl TrackingState {
    pub fn has_order(&self) -> bool {
        matches!(self, TrackingState::Tracking(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, TrackingState::Loading)
    }

    pub fn tracked(&self) -> Option<&TrackedOrder> {
        match self {
            TrackingState::Tracking(tracked) => Some(tracked),
            _ => None,
        }
    }

    pub fn order(&self) -> Option<&Order> {
        self.tracked().map(TrackedOrder::order)
    }

    pub fn progress(&self) -> Option<StageProgress> {
        self.tracked().map(TrackedOrder::progress)
    }

    /// `None` both without an order and for a status outside the stage vocabulary.
    pub fn current_stage_index(&self) -> Option<usize> {
        self.progress().and_then(|p| p.current_index())
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "N/A".to_string(), |ts| ts.format("%d/%m/%Y %I:%M %p UTC").to_string())
}

impl Display for TrackingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tracked = match self {
            TrackingState::Loading => return f.write_str("Loading order details..."),
            TrackingState::NoOrder => return f.write_str("No active order found."),
            TrackingState::Tracking(tracked) => tracked,
        };
        let order = tracked.order();

        writeln!(f, "Order Tracking for Order #{}", order.id)?;
        writeln!(f, "Placed On: {}", format_timestamp(order.order_date))?;
        writeln!(f, "Address: {}", order.delivery_address)?;
        writeln!(f, "Total: ₹{:.2}", order.total_amount)?;
        writeln!(f, "Items:")?;
        for item in &order.items {
            writeln!(
                f,
                "  • {} x {}  ₹{:.2}",
                item.display_name(),
                item.quantity,
                item.line_total()
            )?;
        }
        writeln!(f, "Progress:")?;
        for (stage, state) in tracked.progress().steps() {
            let icon = match state {
                StepState::Completed => '✅',
                StepState::Pending => '⏳',
            };
            writeln!(f, "  {icon} {stage}")?;
        }
        if order.delivered_at.is_some() {
            writeln!(f, "Delivered on: {}", format_timestamp(order.delivered_at))?;
        }
        Ok(())
    }
}
