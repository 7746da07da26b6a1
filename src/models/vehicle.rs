//! Vehicle type with capacity, cost, and route limits.

use serde::{Deserialize, Serialize};

/// A vehicle that can serve at most one route.
///
/// Cost of a used vehicle is `fixed_cost + variable_cost × max(0, distance − free_distance)`.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::Vehicle;
///
/// let v = Vehicle::new(0, 200.0)
///     .with_fixed_cost(500.0)
///     .with_variable_cost(12.0)
///     .with_free_distance(40.0);
/// assert_eq!(v.capacity(), 200.0);
/// assert_eq!(v.route_cost(30.0), 500.0);
/// assert_eq!(v.route_cost(50.0), 620.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    id: usize,
    kind: String,
    capacity: f64,
    fixed_cost: f64,
    variable_cost: f64,
    free_distance: f64,
    max_distance: Option<f64>,
    max_duration: Option<f64>,
    max_customers: Option<usize>,
    min_demand: f64,
    max_demand: Option<f64>,
    speed: f64,
}

impl Vehicle {
    /// Creates a vehicle with the given ID and capacity.
    ///
    /// Default: variable cost 1.0 per distance unit, no fixed cost, no free
    /// distance, no distance/duration/customer limits, any demand, speed 1.0.
    pub fn new(id: usize, capacity: f64) -> Self {
        Self {
            id,
            kind: String::new(),
            capacity,
            fixed_cost: 0.0,
            variable_cost: 1.0,
            free_distance: 0.0,
            max_distance: None,
            max_duration: None,
            max_customers: None,
            min_demand: 0.0,
            max_demand: None,
            speed: 1.0,
        }
    }

    /// Sets the vehicle type label.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Sets the fixed cost charged once when the vehicle is used.
    pub fn with_fixed_cost(mut self, cost: f64) -> Self {
        self.fixed_cost = cost;
        self
    }

    /// Sets cost per unit distance beyond the free allowance.
    pub fn with_variable_cost(mut self, cost: f64) -> Self {
        self.variable_cost = cost;
        self
    }

    /// Sets the distance driven at no variable cost.
    pub fn with_free_distance(mut self, distance: f64) -> Self {
        self.free_distance = distance;
        self
    }

    /// Sets maximum route distance.
    pub fn with_max_distance(mut self, max: f64) -> Self {
        self.max_distance = Some(max);
        self
    }

    /// Sets maximum route duration.
    pub fn with_max_duration(mut self, max: f64) -> Self {
        self.max_duration = Some(max);
        self
    }

    /// Sets the maximum number of customers per route.
    pub fn with_max_customers(mut self, max: usize) -> Self {
        self.max_customers = Some(max);
        self
    }

    /// Sets the demand range this vehicle may deliver to a single customer.
    pub fn with_demand_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_demand = min;
        self.max_demand = Some(max);
        self
    }

    /// Sets travel speed (distance units per time unit).
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Expands this vehicle into `count` identical units with consecutive
    /// ids starting at this vehicle's id.
    ///
    /// A `Vehicle` drives at most one route. A fleet described as vehicle
    /// types with a number of available units is passed to the instance
    /// as the replicated units; a single `Vehicle` of capacity 10 cannot
    /// serve 20 units of demand, however many trips that would take.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_cvrptw::models::Vehicle;
    ///
    /// let fleet = Vehicle::new(0, 10.0).with_kind("van").replicate(4);
    /// assert_eq!(fleet.len(), 4);
    /// assert_eq!(fleet[3].id(), 3);
    /// assert!(fleet.iter().all(|v| v.kind() == "van"));
    /// ```
    pub fn replicate(&self, count: usize) -> Vec<Vehicle> {
        (0..count)
            .map(|i| Vehicle {
                id: self.id + i,
                ..self.clone()
            })
            .collect()
    }

    /// Vehicle ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Vehicle type label.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Maximum load capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Fixed cost for using this vehicle.
    pub fn fixed_cost(&self) -> f64 {
        self.fixed_cost
    }

    /// Cost per unit distance beyond the free allowance.
    pub fn variable_cost(&self) -> f64 {
        self.variable_cost
    }

    /// Distance covered by the fixed cost.
    pub fn free_distance(&self) -> f64 {
        self.free_distance
    }

    /// Maximum distance limit, if any.
    pub fn max_distance(&self) -> Option<f64> {
        self.max_distance
    }

    /// Maximum duration limit, if any.
    pub fn max_duration(&self) -> Option<f64> {
        self.max_duration
    }

    /// Maximum customers per route, if any.
    pub fn max_customers(&self) -> Option<usize> {
        self.max_customers
    }

    /// Smallest demand this vehicle may deliver to one customer.
    pub fn min_demand(&self) -> f64 {
        self.min_demand
    }

    /// Largest demand this vehicle may deliver to one customer, if bounded.
    pub fn max_demand(&self) -> Option<f64> {
        self.max_demand
    }

    /// Travel speed.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Returns `true` if `demand` lies within this vehicle's per-customer bounds.
    pub fn accepts_demand(&self, demand: f64) -> bool {
        demand >= self.min_demand && self.max_demand.is_none_or(|max| demand <= max)
    }

    /// Cost of a used route of the given distance.
    pub fn route_cost(&self, distance: f64) -> f64 {
        self.fixed_cost + self.variable_cost * (distance - self.free_distance).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_new() {
        let v = Vehicle::new(0, 200.0);
        assert_eq!(v.id(), 0);
        assert_eq!(v.capacity(), 200.0);
        assert_eq!(v.variable_cost(), 1.0);
        assert_eq!(v.fixed_cost(), 0.0);
        assert_eq!(v.speed(), 1.0);
        assert!(v.max_distance().is_none());
        assert!(v.max_duration().is_none());
        assert!(v.max_customers().is_none());
        assert!(v.max_demand().is_none());
        assert!(v.accepts_demand(1e9));
    }

    #[test]
    fn test_vehicle_builder() {
        let v = Vehicle::new(1, 100.0)
            .with_kind("tempo")
            .with_fixed_cost(50.0)
            .with_variable_cost(1.5)
            .with_free_distance(10.0)
            .with_max_distance(500.0)
            .with_max_duration(480.0)
            .with_max_customers(12)
            .with_demand_bounds(2.0, 40.0)
            .with_speed(0.5);
        assert_eq!(v.kind(), "tempo");
        assert_eq!(v.fixed_cost(), 50.0);
        assert_eq!(v.free_distance(), 10.0);
        assert_eq!(v.max_distance(), Some(500.0));
        assert_eq!(v.max_duration(), Some(480.0));
        assert_eq!(v.max_customers(), Some(12));
        assert_eq!(v.min_demand(), 2.0);
        assert_eq!(v.max_demand(), Some(40.0));
        assert!(v.accepts_demand(2.0));
        assert!(!v.accepts_demand(1.0));
        assert!(!v.accepts_demand(41.0));
        assert_eq!(v.speed(), 0.5);
    }

    #[test]
    fn test_route_cost_free_distance() {
        let v = Vehicle::new(0, 10.0)
            .with_fixed_cost(100.0)
            .with_variable_cost(2.0)
            .with_free_distance(20.0);
        assert_eq!(v.route_cost(0.0), 100.0);
        assert_eq!(v.route_cost(20.0), 100.0);
        assert_eq!(v.route_cost(25.0), 110.0);
    }

    #[test]
    fn test_replicate() {
        let fleet = Vehicle::new(2, 10.0).with_fixed_cost(5.0).replicate(3);
        let ids: Vec<usize> = fleet.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert!(fleet.iter().all(|v| v.fixed_cost() == 5.0));
    }

    #[test]
    fn test_default_vehicle_json_round_trip() {
        let v = Vehicle::new(0, 10.0);
        let json = serde_json::to_string(&v).expect("serializable");
        let back: Vehicle = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, v);
        assert!(back.accepts_demand(1e9));
    }
}
