//! # Order Tracker CLI
//!
//! Tracks one order in the terminal and redraws the progress view whenever it changes.
//!
//! ```bash
//! # Track an explicit order
//! order-tracker --order 42
//!
//! # Track the latest active order of a user
//! order-tracker --user 7
//!
//! # List a user's orders, oldest first
//! order-tracker --user 7 --history --oldest
//! ```
//!
//! The backend location and polling behaviour come from the environment, see
//! [`order_tracking::lifecycle::config`].

use order_tracking::history::{is_trackable, SortOrder};
use order_tracking::lifecycle::{setup_tracing, TrackerConfig, TrackingSystem};
use order_tracking::model::{Identity, OrderId, UserId};
use order_tracking::tracker::TrackingState;
use tracing::info;

#[derive(Debug, Default)]
struct Args {
    order: Option<OrderId>,
    user: Option<UserId>,
    history: bool,
    sort: SortOrder,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--order" => {
                    let id = args.next().ok_or("--order needs an order id")?;
                    parsed.order = Some(OrderId(id));
                }
                "--user" => {
                    let id = args.next().ok_or("--user needs a user id")?;
                    parsed.user = Some(UserId(id));
                }
                "--history" => parsed.history = true,
                "--oldest" => parsed.sort = SortOrder::OldestFirst,
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(parsed)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let args = Args::parse(std::env::args().skip(1))?;
    let system = TrackingSystem::new(TrackerConfig::load()?)?;
    let identity = args.user.clone().map(|user_id| Identity {
        user_id,
        name: "cli".to_string(),
    });

    if args.history {
        let orders = system.order_history(identity.as_ref(), args.sort).await?;
        if orders.is_empty() {
            println!("No orders found.");
        }
        for order in &orders {
            let badge = if is_trackable(order) {
                format!("Status: {} (trackable)", order.status)
            } else {
                "Delivered".to_string()
            };
            println!("Order #{}  ₹{:.2}  {badge}", order.id, order.total_amount);
        }
        return Ok(());
    }

    let tracker = system.track(args.order, identity.as_ref());
    let mut updates = tracker.subscribe();
    let mut shown: Option<TrackingState> = None;
    let mut interrupt = std::pin::pin!(tokio::signal::ctrl_c());

    loop {
        let state = updates.borrow_and_update().clone();
        if shown.as_ref() != Some(&state) {
            println!("{state}");
            shown = Some(state.clone());
        }
        if state.order().is_some_and(|order| order.is_delivered()) {
            info!("Order delivered, leaving the tracking view");
            break;
        }
        if !tracker.is_active() {
            break;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut interrupt => {
                info!("Interrupted");
                break;
            }
        }
    }

    tracker.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, String> {
        Args::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let args = parse(&["--order", "42", "--user", "7"]).unwrap();
        assert_eq!(args.order, Some(OrderId::from("42")));
        assert_eq!(args.user, Some(UserId::from("7")));
        assert!(!args.history);

        let args = parse(&["--user", "7", "--history", "--oldest"]).unwrap();
        assert!(args.history);
        assert_eq!(args.sort, SortOrder::OldestFirst);

        assert!(parse(&["--order"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }
}
