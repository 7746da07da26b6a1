//! # u-cvrptw
//!
//! Route planning for a heterogeneous vehicle fleet under capacity, time
//! window, per-customer demand, distance, duration, and customer-count
//! constraints (CVRPTW). An initial solution is built by greedy insertion
//! and improved by local search until convergence, a budget, or
//! cancellation.
//!
//! ## Modules
//!
//! - [`models`]: Domain model types (Node, Vehicle, Route, Solution, Instance)
//! - [`distance`]: Distance matrix
//! - [`evaluation`]: Route feasibility checking and cost evaluation
//! - [`constructive`]: Greedy insertion construction with infeasibility diagnosis
//! - [`local_search`]: Neighborhoods (2-opt, Or-opt, Relocate, Exchange, 2-opt*) and acceptance
//! - [`search`]: Search driver, budgets, cancellation, and parallel multi-start
//! - [`error`]: Error types
//!
//! ## Example
//!
//! ```
//! use u_cvrptw::models::{Instance, Node, TimeWindow, Vehicle};
//! use u_cvrptw::search::{solve, SearchBudget};
//!
//! let nodes = vec![
//!     Node::depot(0.0, 0.0),
//!     Node::customer(1, 4.0, 3.0, 5.0, 2.0).with_time_window(TimeWindow::new(0.0, 60.0)),
//!     Node::customer(2, -3.0, 4.0, 5.0, 2.0),
//!     Node::customer(3, 1.0, -6.0, 5.0, 2.0).with_time_window(TimeWindow::new(20.0, 90.0)),
//! ];
//! let vehicles = Vehicle::new(0, 10.0)
//!     .with_fixed_cost(30.0)
//!     .with_variable_cost(1.5)
//!     .with_free_distance(5.0)
//!     .replicate(2);
//! let instance = Instance::from_coordinates(nodes, vehicles).unwrap();
//!
//! let outcome = solve(&instance, SearchBudget::iterations(1_000)).unwrap();
//! assert_eq!(outcome.solution.num_served(), 3);
//! assert!(outcome.solution.verify(&instance).is_ok());
//! ```

pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod search;

pub use error::{InvalidInstanceError, NoFeasibleConstructionError, SolveError};
pub use search::{solve, solve_parallel, solve_with_config, SolveOutcome, SolveResult};
