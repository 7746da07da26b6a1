//! Domain model types for the routing problem.
//!
//! Provides the core abstractions: nodes with demands and time windows,
//! vehicles with capacity and cost parameters, routes as ordered sequences
//! of timed visits, solutions, and the validated [`Instance`].

mod instance;
mod node;
mod route;
mod solution;
mod vehicle;

pub use instance::Instance;
pub use node::{Node, TimeWindow};
pub use route::{Route, Visit};
pub use solution::Solution;
pub use vehicle::Vehicle;
