//! Mutable solution representation used during local search.

use crate::error::SolutionDefect;
use crate::evaluation::{RouteEvaluator, RouteSummary};
use crate::models::{Instance, Solution};

/// Customer sequence and evaluated figures of one vehicle.
#[derive(Debug, Clone)]
pub struct RouteState {
    customers: Vec<usize>,
    summary: RouteSummary,
}

impl RouteState {
    fn unused() -> Self {
        Self {
            customers: Vec::new(),
            summary: RouteSummary::empty(),
        }
    }

    pub fn customers(&self) -> &[usize] {
        &self.customers
    }

    pub fn summary(&self) -> &RouteSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Returns `true` if the vehicle is unused.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn distance(&self) -> f64 {
        self.summary.distance
    }

    pub fn load(&self) -> f64 {
        self.summary.load
    }

    pub fn cost(&self) -> f64 {
        self.summary.cost
    }
}

/// New content for one vehicle produced by a move.
#[derive(Debug, Clone)]
pub(crate) struct RouteUpdate {
    pub vehicle_id: usize,
    pub customers: Vec<usize>,
    pub summary: RouteSummary,
}

/// One route slot per vehicle of the fleet, indexed by vehicle id.
///
/// Every slot is feasible at all times; moves are only written back after
/// the touched routes pass the evaluator.
#[derive(Debug, Clone)]
pub struct WorkingSolution {
    routes: Vec<RouteState>,
    objective: f64,
}

impl WorkingSolution {
    /// A working solution with every vehicle unused.
    pub fn empty(instance: &Instance) -> Self {
        Self {
            routes: vec![RouteState::unused(); instance.num_vehicles()],
            objective: 0.0,
        }
    }

    /// Loads a solution after verifying it against `instance`.
    pub fn from_solution(instance: &Instance, solution: &Solution) -> Result<Self, SolutionDefect> {
        solution.verify(instance)?;
        let mut working = Self::empty(instance);
        for route in solution.routes() {
            let vid = route.vehicle_id();
            let customers = route.customer_ids();
            let summary = RouteEvaluator::new(instance, vid)
                .check(&customers)
                .map_err(|cause| SolutionDefect::InfeasibleRoute {
                    vehicle_id: vid,
                    cause,
                })?;
            working.routes[vid] = RouteState { customers, summary };
        }
        working.refresh_objective();
        Ok(working)
    }

    /// Rebuilds full routes with visit timing for every used vehicle.
    pub fn to_solution(&self, instance: &Instance) -> Result<Solution, SolutionDefect> {
        let mut solution = Solution::new();
        for (vid, state) in self.routes.iter().enumerate() {
            if state.is_empty() {
                continue;
            }
            let route = RouteEvaluator::new(instance, vid)
                .build_route(&state.customers)
                .map_err(|cause| SolutionDefect::InfeasibleRoute {
                    vehicle_id: vid,
                    cause,
                })?;
            solution.add_route(route);
        }
        Ok(solution)
    }

    /// Sum of route costs.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn routes(&self) -> &[RouteState] {
        &self.routes
    }

    pub fn route(&self, vehicle_id: usize) -> &RouteState {
        &self.routes[vehicle_id]
    }

    /// Number of vehicles with at least one customer.
    pub fn num_used(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    pub(crate) fn apply(&mut self, updates: Vec<RouteUpdate>) {
        for update in updates {
            self.routes[update.vehicle_id] = RouteState {
                customers: update.customers,
                summary: update.summary,
            };
        }
        self.refresh_objective();
    }

    fn refresh_objective(&mut self) {
        self.objective = self.routes.iter().map(|r| r.summary.cost).sum();
    }
}
