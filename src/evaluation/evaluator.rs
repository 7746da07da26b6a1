//! Route evaluator that computes timing, load, cost, and feasibility.

use super::Infeasibility;
use crate::models::{Instance, Route, Vehicle, Visit};

/// Absolute slack allowed on floating-point constraint comparisons.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// Aggregate figures of a feasible route, without per-stop detail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    /// Total distance including the legs from and back to the depot.
    pub distance: f64,
    /// Depot departure time.
    pub departure: f64,
    /// Depot return time.
    pub return_time: f64,
    /// Total delivered load.
    pub load: f64,
    /// Number of customers.
    pub customers: usize,
    /// Route cost; zero for an empty route.
    pub cost: f64,
}

impl RouteSummary {
    /// Summary of a route that visits nobody.
    pub fn empty() -> Self {
        Self {
            distance: 0.0,
            departure: 0.0,
            return_time: 0.0,
            load: 0.0,
            customers: 0,
            cost: 0.0,
        }
    }

    /// Elapsed time from departure to return.
    pub fn duration(&self) -> f64 {
        self.return_time - self.departure
    }
}

/// Evaluates routes of one vehicle against every constraint.
///
/// Checks run cheapest-first and stop at the first violation: capacity,
/// per-customer demand bounds, depot opening hours and time windows (with
/// the instance waiting limit), distance and duration budgets with the
/// return before the end of the planning horizon, and the customer-count cap.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Instance, Node, Vehicle};
/// use u_cvrptw::evaluation::RouteEvaluator;
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 3.0, 4.0, 10.0, 5.0),
///     Node::customer(2, 6.0, 8.0, 20.0, 5.0),
/// ];
/// let instance = Instance::from_coordinates(nodes, vec![Vehicle::new(0, 100.0)]).unwrap();
///
/// let evaluator = RouteEvaluator::new(&instance, 0);
/// let route = evaluator.build_route(&[1, 2]).unwrap();
/// assert_eq!(route.len(), 2);
/// assert!((route.total_distance() - 20.0).abs() < 1e-10);
/// ```
pub struct RouteEvaluator<'a> {
    instance: &'a Instance,
    vehicle_id: usize,
    vehicle: &'a Vehicle,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates an evaluator for the vehicle with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `vehicle_id` is not a fleet index of `instance`.
    pub fn new(instance: &'a Instance, vehicle_id: usize) -> Self {
        Self {
            instance,
            vehicle_id,
            vehicle: instance.vehicle(vehicle_id),
        }
    }

    /// The vehicle being evaluated.
    pub fn vehicle(&self) -> &Vehicle {
        self.vehicle
    }

    /// Checks a customer sequence and returns its summary or the first violation.
    pub fn check(&self, customer_ids: &[usize]) -> Result<RouteSummary, Infeasibility> {
        self.walk(customer_ids, None)
    }

    /// Builds a route with full visit timing from a sequence of customer IDs.
    pub fn build_route(&self, customer_ids: &[usize]) -> Result<Route, Infeasibility> {
        let mut visits = Vec::with_capacity(customer_ids.len());
        let summary = self.walk(customer_ids, Some(&mut visits))?;

        let mut route = Route::new(self.vehicle_id);
        for visit in visits {
            route.push_visit(visit);
        }
        route.set_schedule(summary.departure, summary.return_time);
        route.set_total_distance(summary.distance);
        route.set_cost(summary.cost);
        Ok(route)
    }

    /// Cost of a route of this vehicle with the given distance.
    ///
    /// An unused vehicle (no customers) costs nothing.
    pub fn cost_of(&self, distance: f64, customers: usize) -> f64 {
        if customers == 0 {
            0.0
        } else {
            self.vehicle.route_cost(distance)
        }
    }

    /// Depot departure that avoids waiting at the first customer.
    fn departure_time(&self, first: Option<usize>) -> f64 {
        let open = self.instance.depot_open();
        let Some(first) = first else {
            return open;
        };
        match self.instance.node(first).time_window() {
            Some(tw) => {
                let travel = self
                    .instance
                    .travel_time(Instance::DEPOT, first, self.vehicle_id);
                open.max(tw.earliest() - travel)
            }
            None => open,
        }
    }

    fn walk(
        &self,
        customer_ids: &[usize],
        mut visits: Option<&mut Vec<Visit>>,
    ) -> Result<RouteSummary, Infeasibility> {
        let instance = self.instance;
        let vehicle = self.vehicle;

        // 1. Capacity
        let mut load = 0.0;
        for &cid in customer_ids {
            load += instance.node(cid).demand();
            if load > vehicle.capacity() + FEASIBILITY_TOLERANCE {
                return Err(Infeasibility::CapacityExceeded {
                    customer_id: cid,
                    load,
                    capacity: vehicle.capacity(),
                });
            }
        }

        // 2. Per-customer demand bounds
        for &cid in customer_ids {
            let demand = instance.node(cid).demand();
            if !vehicle.accepts_demand(demand) {
                return Err(Infeasibility::DemandOutOfBounds {
                    customer_id: cid,
                    demand,
                    min: vehicle.min_demand(),
                    max: vehicle.max_demand(),
                });
            }
        }

        // 3. Time windows
        let depot = Instance::DEPOT;
        let departure = self.departure_time(customer_ids.first().copied());
        let closes = instance.depot_close();
        if departure > closes + FEASIBILITY_TOLERANCE {
            return Err(Infeasibility::DepotClosed { departure, closes });
        }
        let mut time = departure;
        let mut distance = 0.0;
        let mut delivered = 0.0;
        let mut prev = depot;

        for &cid in customer_ids {
            let node = instance.node(cid);
            distance += instance.distance(prev, cid);
            let arrival = time + instance.travel_time(prev, cid, self.vehicle_id);

            let start = match node.time_window() {
                Some(tw) => {
                    if arrival > tw.latest() + FEASIBILITY_TOLERANCE {
                        return Err(Infeasibility::TimeWindowViolated {
                            customer_id: cid,
                            arrival,
                            latest: tw.latest(),
                        });
                    }
                    arrival + tw.waiting_time(arrival)
                }
                None => arrival,
            };

            if let Some(max_waiting) = instance.max_waiting() {
                let waiting = start - arrival;
                if waiting > max_waiting + FEASIBILITY_TOLERANCE {
                    return Err(Infeasibility::ExcessiveWaiting {
                        customer_id: cid,
                        waiting,
                        max_waiting,
                    });
                }
            }

            let departure_time = start + node.service_duration();
            delivered += node.demand();

            if let Some(v) = visits.as_deref_mut() {
                v.push(Visit {
                    node_id: cid,
                    arrival_time: arrival,
                    start_time: start,
                    departure_time,
                    load_after: delivered,
                });
            }

            time = departure_time;
            prev = cid;
        }

        let return_time = if customer_ids.is_empty() {
            departure
        } else {
            distance += instance.distance(prev, depot);
            time + instance.travel_time(prev, depot, self.vehicle_id)
        };

        // 4. Distance, duration, and horizon budgets
        if let Some(max_distance) = vehicle.max_distance() {
            if distance > max_distance + FEASIBILITY_TOLERANCE {
                return Err(Infeasibility::MaxDistanceExceeded {
                    distance,
                    max_distance,
                });
            }
        }
        let duration = return_time - departure;
        let max_duration = instance.duration_limit(self.vehicle_id);
        if duration > max_duration + FEASIBILITY_TOLERANCE {
            return Err(Infeasibility::MaxDurationExceeded {
                duration,
                max_duration,
            });
        }
        let horizon = instance.planning_horizon();
        if return_time > horizon + FEASIBILITY_TOLERANCE {
            return Err(Infeasibility::HorizonExceeded {
                return_time,
                horizon,
            });
        }

        // 5. Customer-count cap
        if let Some(max_customers) = vehicle.max_customers() {
            if customer_ids.len() > max_customers {
                return Err(Infeasibility::MaxCustomersExceeded {
                    count: customer_ids.len(),
                    max_customers,
                });
            }
        }

        Ok(RouteSummary {
            distance,
            departure,
            return_time,
            load: delivered,
            customers: customer_ids.len(),
            cost: self.cost_of(distance, customer_ids.len()),
        })
    }
}
