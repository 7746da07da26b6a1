//! Solution type and from-scratch verification.

use serde::{Deserialize, Serialize};

use super::{Instance, Route};
use crate::error::SolutionDefect;
use crate::evaluation::RouteEvaluator;

/// Relative tolerance used when comparing stored and recomputed costs.
const COST_TOLERANCE: f64 = 1e-6;

/// A complete solution: one route per used vehicle.
///
/// Every customer of the instance appears in exactly one route exactly once;
/// [`Solution::verify`] checks this together with every route constraint.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Solution, Route};
///
/// let mut sol = Solution::new();
/// sol.add_route(Route::new(0));
/// assert_eq!(sol.num_routes(), 1);
/// assert_eq!(sol.num_served(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
    total_cost: f64,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            total_cost: 0.0,
        }
    }

    /// Adds a route and accumulates its cost into the objective.
    pub fn add_route(&mut self, route: Route) {
        self.total_cost += route.cost();
        self.routes.push(route);
    }

    /// Returns the routes in this solution.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the number of routes (vehicles used).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Objective value: sum of route costs.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Total distance across all routes.
    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.total_distance()).sum()
    }

    /// Total number of customers served (across all routes).
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }

    /// Returns the route serving `customer_id`, if any.
    pub fn route_of(&self, customer_id: usize) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.visits().iter().any(|v| v.node_id == customer_id))
    }

    /// Re-checks this solution against `instance` from scratch.
    ///
    /// Verifies that customers form a partition over the routes, that each
    /// vehicle is used at most once, that every route is feasible, and that
    /// stored costs match recomputed ones.
    pub fn verify(&self, instance: &Instance) -> Result<(), SolutionDefect> {
        let mut seen = vec![false; instance.num_nodes()];
        let mut vehicle_used = vec![false; instance.num_vehicles()];
        let mut objective = 0.0;

        for route in &self.routes {
            let vid = route.vehicle_id();
            if vid >= vehicle_used.len() {
                return Err(SolutionDefect::UnknownVehicle { vehicle_id: vid });
            }
            if vehicle_used[vid] {
                return Err(SolutionDefect::VehicleReused { vehicle_id: vid });
            }
            vehicle_used[vid] = true;

            for visit in route.visits() {
                let id = visit.node_id;
                if id == 0 || id >= seen.len() {
                    return Err(SolutionDefect::UnknownCustomer { node_id: id });
                }
                if seen[id] {
                    return Err(SolutionDefect::DuplicateCustomer { customer_id: id });
                }
                seen[id] = true;
            }

            let evaluator = RouteEvaluator::new(instance, vid);
            let summary = evaluator
                .check(&route.customer_ids())
                .map_err(|cause| SolutionDefect::InfeasibleRoute {
                    vehicle_id: vid,
                    cause,
                })?;
            if !approx_eq(summary.cost, route.cost()) {
                return Err(SolutionDefect::CostMismatch {
                    vehicle_id: vid,
                    stored: route.cost(),
                    recomputed: summary.cost,
                });
            }
            objective += summary.cost;
        }

        if let Some(missing) = (1..seen.len()).find(|&id| !seen[id]) {
            return Err(SolutionDefect::MissingCustomer {
                customer_id: missing,
            });
        }

        if !approx_eq(objective, self.total_cost) {
            return Err(SolutionDefect::ObjectiveMismatch {
                stored: self.total_cost,
                recomputed: objective,
            });
        }
        Ok(())
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= COST_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}
