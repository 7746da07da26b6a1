//! Route feasibility and cost evaluation.
//!
//! Every placement decision in construction and local search goes through
//! [`RouteEvaluator`], which recomputes a route's schedule from the depot
//! and reports the first violated constraint as an [`Infeasibility`].

mod evaluator;
mod infeasibility;

pub use evaluator::{RouteEvaluator, RouteSummary, FEASIBILITY_TOLERANCE};
pub use infeasibility::Infeasibility;
