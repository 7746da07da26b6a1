//! Local search over a feasible working solution.
//!
//! - [`Neighborhood::TwoOpt`]: Intra-route segment reversal
//! - [`Neighborhood::OrOpt`]: Intra-route segment relocation
//! - [`Neighborhood::Relocate`]: Inter-route segment relocation, including unused vehicles
//! - [`Neighborhood::Exchange`]: Inter-route customer swap
//! - [`Neighborhood::TwoOptStar`]: Inter-route tail exchange
//!
//! Each scan prices candidate moves from edge deltas, prunes those the
//! [`Acceptor`] could not take, re-evaluates the touched routes in full and
//! applies at most one move.

mod acceptance;
mod engine;
mod exchange;
mod moves;
mod or_opt;
mod relocate;
mod two_opt;
mod two_opt_star;
mod working;

pub use acceptance::{Acceptor, GreedyAcceptor, SimulatedAnnealingAcceptor, IMPROVEMENT_EPSILON};
pub use engine::{AppliedMove, LocalSearch, LocalSearchConfig, ScanStrategy};
pub use moves::{Move, Neighborhood};
pub use working::{RouteState, WorkingSolution};

use crate::models::Instance;

/// Length of the arc `from -> to`; a depot-to-depot arc (empty route) is zero.
#[inline]
fn arc(instance: &Instance, from: usize, to: usize) -> f64 {
    if from == to {
        0.0
    } else {
        instance.distance(from, to)
    }
}

/// Node visited before position `pos`, or the depot.
#[inline]
fn node_before(route: &[usize], pos: usize) -> usize {
    if pos == 0 {
        Instance::DEPOT
    } else {
        route[pos - 1]
    }
}

/// Node at position `pos`, or the depot past the end.
#[inline]
fn node_at(route: &[usize], pos: usize) -> usize {
    route.get(pos).copied().unwrap_or(Instance::DEPOT)
}
