//! Time-oriented greedy insertion for the heterogeneous-fleet CVRPTW.
//!
//! # Algorithm
//!
//! Routes are built one vehicle at a time, in a caller-supplied priority
//! order. For the open route, every unassigned customer is tried at every
//! position; the feasible insertion with the smallest route-cost increase
//! wins. Ties are broken by the smallest slack (`latest - arrival`) at the
//! inserted customer, then by the smallest distance increase, then by
//! discovery order (customer id, then position).
//!
//! A customer that fits nowhere on the current vehicle is left for the next
//! one. The route closes when no feasible insertion remains.
//!
//! # Complexity
//!
//! O(n³ · V) evaluator calls in the worst case, where n = customers and
//! V = vehicles.
//!
//! # Reference
//!
//! Solomon, M.M. (1987). "Algorithms for the Vehicle Routing and Scheduling
//! Problems with Time Window Constraints", *Operations Research* 35(2), 254-265.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{
    CustomerDiagnosis, NoFeasibleConstructionError, RejectionReason, VehicleRejection,
};
use crate::evaluation::{RouteEvaluator, RouteSummary, FEASIBILITY_TOLERANCE};
use crate::models::{Instance, Solution};

/// Insertion chosen for the open route.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    unassigned_idx: usize,
    position: usize,
    cost_delta: f64,
    slack: f64,
    distance_delta: f64,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        if !approx_eq(self.cost_delta, other.cost_delta) {
            return self.cost_delta < other.cost_delta;
        }
        if !approx_eq(self.slack, other.slack) {
            return self.slack < other.slack;
        }
        !approx_eq(self.distance_delta, other.distance_delta)
            && self.distance_delta < other.distance_delta
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= FEASIBILITY_TOLERANCE
}

/// Vehicles in ascending fixed cost, then ascending id.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Instance, Node, Vehicle};
/// use u_cvrptw::constructive::default_vehicle_order;
///
/// let nodes = vec![Node::depot(0.0, 0.0), Node::customer(1, 1.0, 0.0, 1.0, 0.0)];
/// let vehicles = vec![
///     Vehicle::new(0, 10.0).with_fixed_cost(50.0),
///     Vehicle::new(1, 10.0).with_fixed_cost(20.0),
///     Vehicle::new(2, 10.0).with_fixed_cost(20.0),
/// ];
/// let instance = Instance::from_coordinates(nodes, vehicles).unwrap();
/// assert_eq!(default_vehicle_order(&instance), vec![1, 2, 0]);
/// ```
pub fn default_vehicle_order(instance: &Instance) -> Vec<usize> {
    let mut order: Vec<usize> = (0..instance.num_vehicles()).collect();
    order.sort_by(|&a, &b| {
        let fa = instance.vehicle(a).fixed_cost();
        let fb = instance.vehicle(b).fixed_cost();
        fa.total_cmp(&fb).then(a.cmp(&b))
    });
    order
}

/// Default order with vehicles of equal fixed cost shuffled among themselves.
///
/// Used to diversify the starting point of parallel searches.
pub fn shuffled_vehicle_order<R: Rng + ?Sized>(instance: &Instance, rng: &mut R) -> Vec<usize> {
    let mut order = default_vehicle_order(instance);
    let mut start = 0;
    while start < order.len() {
        let fixed = instance.vehicle(order[start]).fixed_cost();
        let mut end = start + 1;
        while end < order.len() && instance.vehicle(order[end]).fixed_cost() == fixed {
            end += 1;
        }
        order[start..end].shuffle(rng);
        start = end;
    }
    order
}

/// Builds an initial feasible solution by greedy insertion.
///
/// Vehicles are filled in `vehicle_order`; vehicles missing from the order
/// stay unused. Every route of the returned solution is feasible.
///
/// # Errors
///
/// Returns [`NoFeasibleConstructionError`] if customers remain unassigned
/// after every vehicle was tried. The error carries, for each such customer
/// and each vehicle in `vehicle_order`, the cause found by evaluating the
/// customer alone on that vehicle, or [`RejectionReason::RouteExhausted`]
/// when the customer alone would have fit.
///
/// # Panics
///
/// Panics if `vehicle_order` names a vehicle id outside the fleet.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Instance, Node, Vehicle, TimeWindow};
/// use u_cvrptw::constructive::{default_vehicle_order, greedy_insertion};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 1.0, 0.0, 10.0, 2.0)
///         .with_time_window(TimeWindow::new(0.0, 20.0)),
///     Node::customer(2, 2.0, 0.0, 10.0, 2.0)
///         .with_time_window(TimeWindow::new(0.0, 20.0)),
/// ];
/// let instance = Instance::from_coordinates(nodes, vec![Vehicle::new(0, 30.0)]).unwrap();
///
/// let order = default_vehicle_order(&instance);
/// let solution = greedy_insertion(&instance, &order).unwrap();
/// assert_eq!(solution.num_served(), 2);
/// assert!(solution.verify(&instance).is_ok());
/// ```
pub fn greedy_insertion(
    instance: &Instance,
    vehicle_order: &[usize],
) -> Result<Solution, NoFeasibleConstructionError> {
    let mut unassigned: Vec<usize> = instance.customer_ids().collect();
    let mut solution = Solution::new();

    for &vid in vehicle_order {
        if unassigned.is_empty() {
            break;
        }

        let evaluator = RouteEvaluator::new(instance, vid);
        let route_customers = fill_route(instance, &evaluator, &mut unassigned);
        if route_customers.is_empty() {
            continue;
        }

        match evaluator.build_route(&route_customers) {
            Ok(route) => {
                debug!(
                    vehicle = vid,
                    customers = route.len(),
                    cost = route.cost(),
                    "route closed"
                );
                solution.add_route(route);
            }
            Err(cause) => {
                // Every accepted insertion was checked; return the customers
                // to the pool rather than emit an infeasible route.
                warn!(vehicle = vid, %cause, "closed route failed re-evaluation");
                unassigned.extend(route_customers);
                unassigned.sort_unstable();
            }
        }
    }

    if unassigned.is_empty() {
        return Ok(solution);
    }

    let diagnoses = unassigned
        .iter()
        .map(|&cid| diagnose(instance, vehicle_order, cid))
        .collect();
    warn!(
        unassigned = unassigned.len(),
        "construction left customers unassigned"
    );
    Err(NoFeasibleConstructionError {
        customer_ids: unassigned,
        diagnoses,
    })
}

/// Inserts customers into one vehicle's route until nothing else fits.
fn fill_route(
    instance: &Instance,
    evaluator: &RouteEvaluator<'_>,
    unassigned: &mut Vec<usize>,
) -> Vec<usize> {
    let vehicle = evaluator.vehicle();
    let mut route: Vec<usize> = Vec::new();
    let mut current = RouteSummary::empty();
    let mut trial: Vec<usize> = Vec::new();

    loop {
        if vehicle.max_customers().is_some_and(|max| route.len() >= max) {
            break;
        }

        let mut best: Option<Candidate> = None;
        for (ui, &cid) in unassigned.iter().enumerate() {
            let demand = instance.node(cid).demand();
            if !vehicle.accepts_demand(demand)
                || current.load + demand > vehicle.capacity() + FEASIBILITY_TOLERANCE
            {
                continue;
            }

            for pos in 0..=route.len() {
                trial.clear();
                trial.extend_from_slice(&route[..pos]);
                trial.push(cid);
                trial.extend_from_slice(&route[pos..]);

                let Ok(built) = evaluator.build_route(&trial) else {
                    continue;
                };
                let arrival = built.visits()[pos].arrival_time;
                let slack = instance
                    .node(cid)
                    .time_window()
                    .map_or(f64::INFINITY, |tw| tw.slack(arrival));

                let candidate = Candidate {
                    unassigned_idx: ui,
                    position: pos,
                    cost_delta: built.cost() - current.cost,
                    slack,
                    distance_delta: built.total_distance() - current.distance,
                };
                if best.as_ref().is_none_or(|b| candidate.beats(b)) {
                    best = Some(candidate);
                }
            }
        }

        let Some(chosen) = best else {
            break;
        };
        let cid = unassigned.remove(chosen.unassigned_idx);
        route.insert(chosen.position, cid);
        match evaluator.check(&route) {
            Ok(summary) => current = summary,
            Err(_) => {
                route.remove(chosen.position);
                unassigned.insert(chosen.unassigned_idx, cid);
                break;
            }
        }
    }

    route
}

/// Explains why `customer_id` is unassigned, vehicle by vehicle.
fn diagnose(instance: &Instance, vehicle_order: &[usize], customer_id: usize) -> CustomerDiagnosis {
    let rejections = vehicle_order
        .iter()
        .map(|&vid| {
            let reason = match RouteEvaluator::new(instance, vid).check(&[customer_id]) {
                Ok(_) => RejectionReason::RouteExhausted,
                Err(cause) => RejectionReason::Infeasible(cause),
            };
            VehicleRejection {
                vehicle_id: vid,
                reason,
            }
        })
        .collect();
    CustomerDiagnosis {
        customer_id,
        rejections,
    }
}
