//! Scan loop shared by every neighborhood.

use std::ops::ControlFlow;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::working::RouteUpdate;
use super::{
    exchange, or_opt, relocate, two_opt, two_opt_star, Acceptor, Move, Neighborhood,
    WorkingSolution,
};
use crate::evaluation::{RouteEvaluator, FEASIBILITY_TOLERANCE};
use crate::models::Instance;

/// How a scan picks the move to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanStrategy {
    /// Apply the first feasible move the acceptor takes.
    #[default]
    FirstImprovement,
    /// Evaluate the whole neighborhood and offer the best feasible move.
    BestImprovement,
}

/// Local search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSearchConfig {
    /// Neighborhoods in scan order.
    pub neighborhoods: Vec<Neighborhood>,
    pub strategy: ScanStrategy,
    /// Longest segment moved by or-opt and relocate.
    pub max_segment_len: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            neighborhoods: Neighborhood::ALL.to_vec(),
            strategy: ScanStrategy::FirstImprovement,
            max_segment_len: 3,
        }
    }
}

impl LocalSearchConfig {
    pub fn with_neighborhoods(mut self, neighborhoods: Vec<Neighborhood>) -> Self {
        self.neighborhoods = neighborhoods;
        self
    }

    pub fn with_strategy(mut self, strategy: ScanStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_segment_len(mut self, len: usize) -> Self {
        self.max_segment_len = len.max(1);
        self
    }
}

/// A move written back to the working solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedMove {
    pub operation: Move,
    /// Exact objective change.
    pub delta: f64,
}

/// A feasible move with its re-evaluated routes.
struct Evaluated {
    operation: Move,
    delta: f64,
    updates: Vec<RouteUpdate>,
}

/// State of one scan, handed to each neighborhood in turn.
pub(super) struct ScanContext<'a> {
    instance: &'a Instance,
    working: &'a WorkingSolution,
    acceptor: &'a mut dyn Acceptor,
    rng: &'a mut dyn RngCore,
    strategy: ScanStrategy,
    max_segment_len: usize,
    threshold: f64,
    chosen: Option<Evaluated>,
}

impl<'a> ScanContext<'a> {
    pub(super) fn instance(&self) -> &'a Instance {
        self.instance
    }

    pub(super) fn working(&self) -> &'a WorkingSolution {
        self.working
    }

    pub(super) fn max_segment_len(&self) -> usize {
        self.max_segment_len
    }

    /// Cost change of `vehicle_id` if its route became `new_len` customers
    /// long with total distance `new_distance`.
    pub(super) fn cost_change(&self, vehicle_id: usize, new_distance: f64, new_len: usize) -> f64 {
        let new_cost = if new_len == 0 {
            0.0
        } else {
            self.instance.vehicle(vehicle_id).route_cost(new_distance)
        };
        new_cost - self.working.route(vehicle_id).cost()
    }

    /// Offers a move with its estimated delta.
    ///
    /// Breaks when the scan should stop because a move was taken.
    pub(super) fn consider(&mut self, operation: Move, estimate: f64) -> ControlFlow<()> {
        if estimate > self.threshold + FEASIBILITY_TOLERANCE {
            return ControlFlow::Continue(());
        }
        if self.strategy == ScanStrategy::BestImprovement {
            if let Some(best) = &self.chosen {
                if estimate >= best.delta - FEASIBILITY_TOLERANCE {
                    return ControlFlow::Continue(());
                }
            }
        }

        let mut updates = Vec::with_capacity(2);
        let mut delta = 0.0;
        for (vehicle_id, customers) in operation.resulting_routes(self.working) {
            let Ok(summary) = RouteEvaluator::new(self.instance, vehicle_id).check(&customers)
            else {
                return ControlFlow::Continue(());
            };
            delta += summary.cost - self.working.route(vehicle_id).cost();
            updates.push(RouteUpdate {
                vehicle_id,
                customers,
                summary,
            });
        }

        let evaluated = Evaluated {
            operation,
            delta,
            updates,
        };
        match self.strategy {
            ScanStrategy::FirstImprovement => {
                if self.acceptor.accept(delta, &mut *self.rng) {
                    self.chosen = Some(evaluated);
                    return ControlFlow::Break(());
                }
            }
            ScanStrategy::BestImprovement => {
                let better = self
                    .chosen
                    .as_ref()
                    .is_none_or(|best| delta < best.delta - FEASIBILITY_TOLERANCE);
                if better {
                    self.chosen = Some(evaluated);
                }
            }
        }
        ControlFlow::Continue(())
    }
}

/// Neighborhood search over a [`WorkingSolution`].
///
/// # Examples
///
/// ```
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use u_cvrptw::constructive::{default_vehicle_order, greedy_insertion};
/// use u_cvrptw::local_search::{GreedyAcceptor, LocalSearch, LocalSearchConfig, WorkingSolution};
/// use u_cvrptw::models::{Instance, Node, Vehicle};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 1.0, 1.0, 10.0, 0.0),
///     Node::customer(2, -1.0, -1.0, 10.0, 0.0),
///     Node::customer(3, 1.0, -1.0, 10.0, 0.0),
///     Node::customer(4, -1.0, 1.0, 10.0, 0.0),
/// ];
/// let instance = Instance::from_coordinates(nodes, Vehicle::new(0, 20.0).replicate(3)).unwrap();
/// let initial = greedy_insertion(&instance, &default_vehicle_order(&instance)).unwrap();
///
/// let mut working = WorkingSolution::from_solution(&instance, &initial).unwrap();
/// let search = LocalSearch::new(LocalSearchConfig::default());
/// let mut rng = SmallRng::seed_from_u64(42);
/// search.improve(&instance, &mut working, &mut GreedyAcceptor, &mut rng, 1000);
///
/// assert!(working.objective() <= initial.total_cost() + 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct LocalSearch {
    config: LocalSearchConfig,
}

impl LocalSearch {
    pub fn new(config: LocalSearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    /// Runs one scan over the configured neighborhoods and applies at most
    /// one move. Returns the applied move, if any.
    pub fn scan(
        &self,
        instance: &Instance,
        working: &mut WorkingSolution,
        acceptor: &mut dyn Acceptor,
        rng: &mut dyn RngCore,
    ) -> Option<AppliedMove> {
        let threshold = acceptor.threshold();
        let mut ctx = ScanContext {
            instance,
            working: &*working,
            acceptor: &mut *acceptor,
            rng: &mut *rng,
            strategy: self.config.strategy,
            max_segment_len: self.config.max_segment_len.max(1),
            threshold,
            chosen: None,
        };

        for neighborhood in &self.config.neighborhoods {
            let flow = match neighborhood {
                Neighborhood::TwoOpt => two_opt::scan(&mut ctx),
                Neighborhood::OrOpt => or_opt::scan(&mut ctx),
                Neighborhood::Relocate => relocate::scan(&mut ctx),
                Neighborhood::Exchange => exchange::scan(&mut ctx),
                Neighborhood::TwoOptStar => two_opt_star::scan(&mut ctx),
            };
            if flow.is_break() {
                break;
            }
        }

        let chosen = ctx.chosen.take()?;
        if self.config.strategy == ScanStrategy::BestImprovement
            && !acceptor.accept(chosen.delta, rng)
        {
            return None;
        }

        let applied = AppliedMove {
            operation: chosen.operation,
            delta: chosen.delta,
        };
        working.apply(chosen.updates);
        debug!(
            neighborhood = ?applied.operation.neighborhood(),
            vehicles = ?applied.operation.vehicles(),
            delta = applied.delta,
            objective = working.objective(),
            "move applied"
        );
        Some(applied)
    }

    /// Repeats scans until one applies no move or `max_scans` is reached.
    /// Returns the number of applied moves.
    pub fn improve(
        &self,
        instance: &Instance,
        working: &mut WorkingSolution,
        acceptor: &mut dyn Acceptor,
        rng: &mut dyn RngCore,
        max_scans: usize,
    ) -> usize {
        let mut applied = 0;
        for _ in 0..max_scans {
            if self.scan(instance, working, acceptor, rng).is_none() {
                break;
            }
            acceptor.end_iteration();
            applied += 1;
        }
        applied
    }
}
