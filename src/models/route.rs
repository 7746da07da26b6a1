//! Route and visit types.

use serde::{Deserialize, Serialize};

/// A single stop within a route.
///
/// Tracks the node together with its computed schedule and load trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Node ID being visited.
    pub node_id: usize,
    /// Arrival time at this node.
    pub arrival_time: f64,
    /// Service start (arrival plus any waiting for the window to open).
    pub start_time: f64,
    /// Departure time (start + service duration).
    pub departure_time: f64,
    /// Cumulative load delivered up to and including this stop.
    pub load_after: f64,
}

impl Visit {
    /// Time spent waiting before service.
    pub fn waiting_time(&self) -> f64 {
        self.start_time - self.arrival_time
    }
}

/// An ordered sequence of customer visits assigned to a single vehicle.
///
/// A route starts and ends at the depot (not stored in `visits`). Routes are
/// produced by [`RouteEvaluator::build_route`](crate::evaluation::RouteEvaluator::build_route),
/// which only returns feasible ones.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Route, Visit};
///
/// let mut route = Route::new(0);
/// route.push_visit(Visit {
///     node_id: 1,
///     arrival_time: 10.0,
///     start_time: 12.0,
///     departure_time: 20.0,
///     load_after: 10.0,
/// });
/// assert_eq!(route.len(), 1);
/// assert_eq!(route.total_load(), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    vehicle_id: usize,
    visits: Vec<Visit>,
    departure_time: f64,
    return_time: f64,
    total_distance: f64,
    total_load: f64,
    cost: f64,
}

impl Route {
    /// Creates an empty route for the given vehicle.
    pub fn new(vehicle_id: usize) -> Self {
        Self {
            vehicle_id,
            visits: Vec::new(),
            departure_time: 0.0,
            return_time: 0.0,
            total_distance: 0.0,
            total_load: 0.0,
            cost: 0.0,
        }
    }

    /// Appends a visit to the end of this route.
    pub fn push_visit(&mut self, visit: Visit) {
        self.total_load = visit.load_after;
        self.visits.push(visit);
    }

    /// Returns the vehicle assigned to this route.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// Returns the ordered sequence of visits.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Returns the number of customer visits (excluding depot).
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Returns `true` if this route has no customer visits.
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Returns the customer IDs in visit order.
    pub fn customer_ids(&self) -> Vec<usize> {
        self.visits.iter().map(|v| v.node_id).collect()
    }

    /// Time the vehicle leaves the depot.
    pub fn departure_time(&self) -> f64 {
        self.departure_time
    }

    /// Time the vehicle is back at the depot.
    pub fn return_time(&self) -> f64 {
        self.return_time
    }

    /// Elapsed time from depot departure to depot return.
    pub fn total_duration(&self) -> f64 {
        self.return_time - self.departure_time
    }

    /// Total distance of this route.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Total load delivered by this route.
    pub fn total_load(&self) -> f64 {
        self.total_load
    }

    /// Route cost (fixed plus variable).
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub(crate) fn set_schedule(&mut self, departure_time: f64, return_time: f64) {
        self.departure_time = departure_time;
        self.return_time = return_time;
    }

    pub(crate) fn set_total_distance(&mut self, d: f64) {
        self.total_distance = d;
    }

    pub(crate) fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }
}
