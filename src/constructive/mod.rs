//! Construction heuristic for the initial solution.
//!
//! - [`greedy_insertion`]: Time-oriented sequential insertion over a
//!   heterogeneous fleet (Solomon, 1987), with diagnosis of unplaceable customers
//! - [`default_vehicle_order`]: Cheapest-fixed-cost-first vehicle priority

mod greedy_insertion;

pub use greedy_insertion::{default_vehicle_order, greedy_insertion, shuffled_vehicle_order};
