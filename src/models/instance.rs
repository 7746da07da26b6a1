//! Validated routing instance.

use serde::{Deserialize, Serialize};

use super::{Node, TimeWindow, Vehicle};
use crate::distance::DistanceMatrix;
use crate::error::InvalidInstanceError;

/// An immutable CVRPTW instance: nodes, fleet, distances, and horizon.
///
/// Node 0 is the depot and node ids equal their index; vehicle ids equal
/// their fleet index. The instance is validated on construction and passed
/// by reference to every solver component.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Instance, Node, Vehicle};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 3.0, 4.0, 10.0, 5.0),
///     Node::customer(2, 6.0, 8.0, 20.0, 5.0),
/// ];
/// let vehicles = vec![Vehicle::new(0, 100.0).with_speed(2.0)];
/// let instance = Instance::from_coordinates(nodes, vehicles).unwrap();
///
/// assert_eq!(instance.num_customers(), 2);
/// assert!((instance.distance(0, 1) - 5.0).abs() < 1e-10);
/// assert!((instance.travel_time(0, 1, 0) - 2.5).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "InstanceParts")]
pub struct Instance {
    nodes: Vec<Node>,
    vehicles: Vec<Vehicle>,
    distances: DistanceMatrix,
    planning_horizon: f64,
    max_waiting: Option<f64>,
    #[serde(skip_serializing)]
    symmetric: bool,
}

/// Serialized form of an [`Instance`], validated on the way in.
#[derive(Deserialize)]
struct InstanceParts {
    nodes: Vec<Node>,
    vehicles: Vec<Vehicle>,
    distances: DistanceMatrix,
    #[serde(default = "default_planning_horizon")]
    planning_horizon: f64,
    #[serde(default)]
    max_waiting: Option<f64>,
}

fn default_planning_horizon() -> f64 {
    Instance::DEFAULT_PLANNING_HORIZON
}

impl TryFrom<InstanceParts> for Instance {
    type Error = InvalidInstanceError;

    fn try_from(parts: InstanceParts) -> Result<Self, Self::Error> {
        Instance::assemble(
            parts.nodes,
            parts.vehicles,
            parts.distances,
            parts.planning_horizon,
            parts.max_waiting,
        )
    }
}

impl Instance {
    /// Planning horizon used when none is configured.
    pub const DEFAULT_PLANNING_HORIZON: f64 = 720.0;

    /// Node index of the depot.
    pub const DEPOT: usize = 0;

    /// Creates and validates an instance.
    pub fn new(
        nodes: Vec<Node>,
        vehicles: Vec<Vehicle>,
        distances: DistanceMatrix,
    ) -> Result<Self, InvalidInstanceError> {
        Self::assemble(nodes, vehicles, distances, Self::DEFAULT_PLANNING_HORIZON, None)
    }

    fn assemble(
        nodes: Vec<Node>,
        vehicles: Vec<Vehicle>,
        distances: DistanceMatrix,
        planning_horizon: f64,
        max_waiting: Option<f64>,
    ) -> Result<Self, InvalidInstanceError> {
        let mut instance = Self {
            nodes,
            vehicles,
            distances,
            planning_horizon,
            max_waiting,
            symmetric: false,
        };
        instance.validate()?;
        instance.symmetric = instance.distances.is_symmetric(1e-9);
        Ok(instance)
    }

    /// Creates an instance with Euclidean distances between node coordinates.
    pub fn from_coordinates(
        nodes: Vec<Node>,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, InvalidInstanceError> {
        let distances = DistanceMatrix::from_nodes(&nodes);
        Self::new(nodes, vehicles, distances)
    }

    /// Sets the planning horizon `[0, horizon]` covered by the depot window.
    pub fn with_planning_horizon(mut self, horizon: f64) -> Result<Self, InvalidInstanceError> {
        self.planning_horizon = horizon;
        self.validate()?;
        Ok(self)
    }

    /// Limits how long a vehicle may wait at any stop for a window to open.
    pub fn with_max_waiting(mut self, max_waiting: f64) -> Result<Self, InvalidInstanceError> {
        self.max_waiting = Some(max_waiting);
        self.validate()?;
        Ok(self)
    }

    /// Checks every structural and data invariant of the instance.
    pub fn validate(&self) -> Result<(), InvalidInstanceError> {
        if self.nodes.is_empty() {
            return Err(InvalidInstanceError::MissingDepot);
        }
        if !self.planning_horizon.is_finite() || self.planning_horizon <= 0.0 {
            return Err(InvalidInstanceError::InvalidHorizon {
                horizon: self.planning_horizon,
            });
        }
        if let Some(w) = self.max_waiting {
            if !(w >= 0.0) {
                return Err(InvalidInstanceError::InvalidWaitingLimit { max_waiting: w });
            }
        }
        let size = self.distances.size();
        if self.distances.num_entries() != size * size {
            return Err(InvalidInstanceError::MalformedMatrix {
                size,
                entries: self.distances.num_entries(),
            });
        }
        if size != self.nodes.len() {
            return Err(InvalidInstanceError::MatrixSizeMismatch {
                expected: self.nodes.len(),
                actual: self.distances.size(),
            });
        }
        if let Some((from, to, distance)) = self.distances.first_invalid_entry() {
            return Err(InvalidInstanceError::InvalidDistance { from, to, distance });
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if node.id() != index {
                return Err(InvalidInstanceError::NodeIdMismatch { index, id: node.id() });
            }
            if !(node.demand() >= 0.0) || !node.demand().is_finite() {
                return Err(InvalidInstanceError::InvalidDemand {
                    node_id: index,
                    demand: node.demand(),
                });
            }
            if !(node.service_duration() >= 0.0) || !node.service_duration().is_finite() {
                return Err(InvalidInstanceError::InvalidServiceDuration {
                    node_id: index,
                    duration: node.service_duration(),
                });
            }
            if let Some(tw) = node.time_window() {
                if !tw.is_valid() {
                    return Err(InvalidInstanceError::InvertedTimeWindow {
                        node_id: index,
                        earliest: tw.earliest(),
                        latest: tw.latest(),
                    });
                }
            }
        }
        if let Some(tw) = self.nodes[Self::DEPOT].time_window() {
            if tw.latest() < 0.0 || tw.earliest() > self.planning_horizon {
                return Err(InvalidInstanceError::DepotWindowOutsideHorizon {
                    earliest: tw.earliest(),
                    latest: tw.latest(),
                    horizon: self.planning_horizon,
                });
            }
        }
        if self.nodes[Self::DEPOT].demand() != 0.0 {
            return Err(InvalidInstanceError::DepotDemand {
                demand: self.nodes[Self::DEPOT].demand(),
            });
        }

        for (index, vehicle) in self.vehicles.iter().enumerate() {
            validate_vehicle(index, vehicle)?;
        }

        if self.num_customers() > 0 && self.vehicles.is_empty() {
            return Err(InvalidInstanceError::EmptyFleet);
        }
        let max_capacity = self
            .vehicles
            .iter()
            .map(|v| v.capacity())
            .fold(f64::NEG_INFINITY, f64::max);
        for node in self.customers() {
            if node.demand() > max_capacity {
                return Err(InvalidInstanceError::DemandExceedsFleet {
                    node_id: node.id(),
                    demand: node.demand(),
                    max_capacity,
                });
            }
        }
        Ok(())
    }

    /// All nodes (index 0 = depot).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node by id.
    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    /// The depot node.
    pub fn depot(&self) -> &Node {
        &self.nodes[Self::DEPOT]
    }

    /// Customer nodes (excluding the depot).
    pub fn customers(&self) -> &[Node] {
        &self.nodes[1..]
    }

    /// Customer ids in ascending order.
    pub fn customer_ids(&self) -> impl Iterator<Item = usize> + '_ {
        1..self.nodes.len()
    }

    /// Number of nodes including the depot.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of customers (excluding depot).
    pub fn num_customers(&self) -> usize {
        self.nodes.len() - 1
    }

    /// The fleet.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Vehicle by id.
    pub fn vehicle(&self, id: usize) -> &Vehicle {
        &self.vehicles[id]
    }

    /// Fleet size.
    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// The underlying distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Returns `true` if `distance(i, j) == distance(j, i)` for all pairs.
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Travel distance from node `from` to node `to`.
    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    /// Travel time from node `from` to node `to` for the given vehicle.
    #[inline]
    pub fn travel_time(&self, from: usize, to: usize, vehicle: usize) -> f64 {
        self.distances.get(from, to) / self.vehicles[vehicle].speed()
    }

    /// Length of the planning horizon.
    pub fn planning_horizon(&self) -> f64 {
        self.planning_horizon
    }

    /// Opening hours of the depot, clipped to the planning horizon.
    ///
    /// A depot without a window of its own is open over `[0, horizon]`.
    pub fn depot_window(&self) -> TimeWindow {
        let horizon = self.planning_horizon;
        match self.depot().time_window() {
            Some(tw) => TimeWindow::new(tw.earliest().max(0.0), tw.latest().min(horizon)),
            None => TimeWindow::new(0.0, horizon),
        }
    }

    /// Earliest departure from the depot.
    pub fn depot_open(&self) -> f64 {
        self.depot_window().earliest()
    }

    /// Latest departure from the depot.
    pub fn depot_close(&self) -> f64 {
        self.depot_window().latest()
    }

    /// Maximum waiting allowed at a single stop, if limited.
    pub fn max_waiting(&self) -> Option<f64> {
        self.max_waiting
    }

    /// Route duration limit for a vehicle; the planning horizon when the
    /// vehicle has no limit of its own.
    pub fn duration_limit(&self, vehicle: usize) -> f64 {
        self.vehicles[vehicle]
            .max_duration()
            .unwrap_or(self.planning_horizon)
    }
}

fn validate_vehicle(index: usize, vehicle: &Vehicle) -> Result<(), InvalidInstanceError> {
    if vehicle.id() != index {
        return Err(InvalidInstanceError::VehicleIdMismatch {
            index,
            id: vehicle.id(),
        });
    }
    if !(vehicle.capacity() >= 0.0) {
        return Err(InvalidInstanceError::InvalidCapacity {
            vehicle_id: index,
            capacity: vehicle.capacity(),
        });
    }
    if !(vehicle.speed() > 0.0) || !vehicle.speed().is_finite() {
        return Err(InvalidInstanceError::InvalidSpeed {
            vehicle_id: index,
            speed: vehicle.speed(),
        });
    }
    if let Some(max) = vehicle.max_demand() {
        if !(vehicle.min_demand() <= max) {
            return Err(InvalidInstanceError::InvertedDemandBounds {
                vehicle_id: index,
                min: vehicle.min_demand(),
                max,
            });
        }
    }
    let parameters = [
        ("fixed_cost", Some(vehicle.fixed_cost())),
        ("variable_cost", Some(vehicle.variable_cost())),
        ("free_distance", Some(vehicle.free_distance())),
        ("max_distance", vehicle.max_distance()),
        ("max_duration", vehicle.max_duration()),
    ];
    for (parameter, value) in parameters {
        if let Some(value) = value {
            if !(value >= 0.0) {
                return Err(InvalidInstanceError::NegativeParameter {
                    vehicle_id: index,
                    parameter,
                    value,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;

    fn nodes() -> Vec<Node> {
        vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 3.0, 4.0, 10.0, 5.0),
            Node::customer(2, 6.0, 8.0, 20.0, 5.0),
        ]
    }

    #[test]
    fn test_valid_instance() {
        let inst = Instance::from_coordinates(nodes(), vec![Vehicle::new(0, 50.0)])
            .expect("valid");
        assert_eq!(inst.num_nodes(), 3);
        assert_eq!(inst.num_customers(), 2);
        assert_eq!(inst.customer_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert!(inst.is_symmetric());
        assert_eq!(inst.planning_horizon(), 720.0);
        assert_eq!(inst.duration_limit(0), 720.0);
        assert_eq!(inst.depot_open(), 0.0);
    }

    #[test]
    fn test_inverted_time_window() {
        let mut n = nodes();
        n[1] = n[1].clone().with_time_window(TimeWindow::new(50.0, 10.0));
        let err = Instance::from_coordinates(n, vec![Vehicle::new(0, 50.0)]).unwrap_err();
        assert_eq!(
            err,
            InvalidInstanceError::InvertedTimeWindow {
                node_id: 1,
                earliest: 50.0,
                latest: 10.0
            }
        );
    }

    #[test]
    fn test_demand_exceeds_fleet() {
        let vehicles = vec![Vehicle::new(0, 15.0), Vehicle::new(1, 12.0)];
        let err = Instance::from_coordinates(nodes(), vehicles).unwrap_err();
        assert!(matches!(
            err,
            InvalidInstanceError::DemandExceedsFleet { node_id: 2, .. }
        ));
    }

    #[test]
    fn test_negative_demand_and_capacity() {
        let mut n = nodes();
        n[2] = Node::customer(2, 1.0, 1.0, -1.0, 0.0);
        let err = Instance::from_coordinates(n, vec![Vehicle::new(0, 50.0)]).unwrap_err();
        assert!(matches!(err, InvalidInstanceError::InvalidDemand { node_id: 2, .. }));

        let err = Instance::from_coordinates(nodes(), vec![Vehicle::new(0, -5.0)]).unwrap_err();
        assert!(matches!(err, InvalidInstanceError::InvalidCapacity { .. }));
    }

    #[test]
    fn test_id_mismatches() {
        let mut n = nodes();
        n.swap(1, 2);
        let err = Instance::from_coordinates(n, vec![Vehicle::new(0, 50.0)]).unwrap_err();
        assert_eq!(err, InvalidInstanceError::NodeIdMismatch { index: 1, id: 2 });

        let err = Instance::from_coordinates(nodes(), vec![Vehicle::new(3, 50.0)]).unwrap_err();
        assert_eq!(err, InvalidInstanceError::VehicleIdMismatch { index: 0, id: 3 });
    }

    #[test]
    fn test_empty_fleet_and_matrix_mismatch() {
        let err = Instance::from_coordinates(nodes(), vec![]).unwrap_err();
        assert_eq!(err, InvalidInstanceError::EmptyFleet);

        let err = Instance::new(nodes(), vec![Vehicle::new(0, 50.0)], DistanceMatrix::new(2))
            .unwrap_err();
        assert_eq!(
            err,
            InvalidInstanceError::MatrixSizeMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_vehicle_parameters() {
        let err = Instance::from_coordinates(nodes(), vec![Vehicle::new(0, 50.0).with_speed(0.0)])
            .unwrap_err();
        assert!(matches!(err, InvalidInstanceError::InvalidSpeed { .. }));

        let v = Vehicle::new(0, 50.0).with_demand_bounds(10.0, 5.0);
        let err = Instance::from_coordinates(nodes(), vec![v]).unwrap_err();
        assert!(matches!(err, InvalidInstanceError::InvertedDemandBounds { .. }));

        let v = Vehicle::new(0, 50.0).with_free_distance(-1.0);
        let err = Instance::from_coordinates(nodes(), vec![v]).unwrap_err();
        assert!(matches!(
            err,
            InvalidInstanceError::NegativeParameter {
                parameter: "free_distance",
                ..
            }
        ));
    }

    #[test]
    fn test_horizon_and_waiting() {
        let inst = Instance::from_coordinates(nodes(), vec![Vehicle::new(0, 50.0)])
            .expect("valid")
            .with_planning_horizon(480.0)
            .expect("valid horizon")
            .with_max_waiting(10.0)
            .expect("valid waiting");
        assert_eq!(inst.duration_limit(0), 480.0);
        assert_eq!(inst.max_waiting(), Some(10.0));

        let err = Instance::from_coordinates(nodes(), vec![Vehicle::new(0, 50.0)])
            .expect("valid")
            .with_planning_horizon(0.0)
            .unwrap_err();
        assert!(matches!(err, InvalidInstanceError::InvalidHorizon { .. }));
    }

    #[test]
    fn test_travel_time_uses_speed() {
        let vehicles = vec![Vehicle::new(0, 50.0), Vehicle::new(1, 50.0).with_speed(0.5)];
        let inst = Instance::from_coordinates(nodes(), vehicles).expect("valid");
        assert!((inst.travel_time(0, 1, 0) - 5.0).abs() < 1e-10);
        assert!((inst.travel_time(0, 1, 1) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_depot_window_defaults_to_horizon() {
        let inst = Instance::from_coordinates(nodes(), vec![Vehicle::new(0, 50.0)])
            .expect("valid")
            .with_planning_horizon(480.0)
            .expect("valid horizon");
        assert_eq!(inst.depot_window(), TimeWindow::new(0.0, 480.0));
        assert_eq!(inst.depot_close(), 480.0);
    }

    #[test]
    fn test_depot_window_clipped_and_checked() {
        let mut n = nodes();
        n[0] = Node::depot(0.0, 0.0).with_time_window(TimeWindow::new(30.0, 900.0));
        let inst = Instance::from_coordinates(n, vec![Vehicle::new(0, 50.0)]).expect("valid");
        assert_eq!(inst.depot_open(), 30.0);
        assert_eq!(inst.depot_close(), 720.0);

        let mut n = nodes();
        n[0] = Node::depot(0.0, 0.0).with_time_window(TimeWindow::new(800.0, 900.0));
        let err = Instance::from_coordinates(n, vec![Vehicle::new(0, 50.0)]).unwrap_err();
        assert_eq!(
            err,
            InvalidInstanceError::DepotWindowOutsideHorizon {
                earliest: 800.0,
                latest: 900.0,
                horizon: 720.0
            }
        );
    }

    #[test]
    fn test_deserialization_validates() {
        let inst = Instance::from_coordinates(nodes(), vec![Vehicle::new(0, 50.0)])
            .expect("valid");
        let mut value = serde_json::to_value(&inst).expect("serializable");
        assert!(value.get("symmetric").is_none());

        let back: Instance = serde_json::from_value(value.clone()).expect("valid");
        assert!(back.is_symmetric());
        assert_eq!(back.depot_close(), 720.0);

        value["distances"]["data"] = serde_json::json!([0.0, 1.0]);
        let err = serde_json::from_value::<Instance>(value).unwrap_err();
        assert!(err.to_string().contains("holds 2 entries"));
    }
}
