//! Node (depot or customer) and time window types.

use serde::{Deserialize, Serialize};

/// A service time window `[earliest, latest]` at a node.
///
/// A vehicle arriving before `earliest` waits; arriving after `latest`
/// makes the route infeasible. Windows are not validated on construction;
/// [`Instance::new`](super::Instance::new) rejects inverted or non-finite ones.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0);
/// assert!(tw.is_valid());
/// assert!(tw.contains(150.0));
/// assert!(!tw.contains(250.0));
/// assert_eq!(tw.waiting_time(80.0), 20.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    earliest: f64,
    latest: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(earliest: f64, latest: f64) -> Self {
        Self { earliest, latest }
    }

    /// Earliest allowable service start.
    pub fn earliest(&self) -> f64 {
        self.earliest
    }

    /// Latest allowable arrival.
    pub fn latest(&self) -> f64 {
        self.latest
    }

    /// Returns `true` if both bounds are finite and `earliest <= latest`.
    pub fn is_valid(&self) -> bool {
        self.earliest.is_finite() && self.latest.is_finite() && self.earliest <= self.latest
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.earliest && time <= self.latest
    }

    /// Returns the waiting time if arriving at the given time.
    ///
    /// Zero if the vehicle arrives within or after the window.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        if arrival < self.earliest {
            self.earliest - arrival
        } else {
            0.0
        }
    }

    /// Returns `true` if arriving at the given time violates this window.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.latest
    }

    /// Time left before the window closes when arriving at `arrival`.
    pub fn slack(&self, arrival: f64) -> f64 {
        self.latest - arrival
    }
}

/// A location in a routing instance.
///
/// Node 0 is the depot. Every other node is a customer with a demand,
/// a service duration, and an optional time window. For geographic data
/// `x`/`y` hold latitude/longitude; the engine itself only reads distances
/// from the instance matrix.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Node, TimeWindow};
///
/// let depot = Node::depot(28.65, 77.21);
/// assert_eq!(depot.id(), 0);
/// assert!(depot.is_depot());
///
/// let c = Node::customer(1, 28.70, 77.10, 12.5, 10.0)
///     .with_time_window(TimeWindow::new(60.0, 180.0));
/// assert_eq!(c.demand(), 12.5);
/// assert_eq!(c.time_window().map(|tw| tw.latest()), Some(180.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: usize,
    x: f64,
    y: f64,
    demand: f64,
    service_duration: f64,
    time_window: Option<TimeWindow>,
}

impl Node {
    /// Creates a customer node.
    pub fn customer(id: usize, x: f64, y: f64, demand: f64, service_duration: f64) -> Self {
        Self {
            id,
            x,
            y,
            demand,
            service_duration,
            time_window: None,
        }
    }

    /// Creates the depot at the given coordinates (id = 0, demand = 0).
    ///
    /// Without a time window the depot is open over the instance's whole
    /// planning horizon.
    pub fn depot(x: f64, y: f64) -> Self {
        Self::customer(0, x, y, 0.0, 0.0)
    }

    /// Sets a time window for this node.
    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = Some(tw);
        self
    }

    /// Node ID (0 = depot).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns `true` for the depot.
    pub fn is_depot(&self) -> bool {
        self.id == 0
    }

    /// X-coordinate (or latitude).
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate (or longitude).
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Quantity delivered to this node.
    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Time spent servicing this node.
    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    /// Time window constraint, if any.
    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    /// Euclidean distance to another node.
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_validity() {
        assert!(TimeWindow::new(10.0, 20.0).is_valid());
        assert!(TimeWindow::new(10.0, 10.0).is_valid());
        assert!(!TimeWindow::new(20.0, 10.0).is_valid());
        assert!(!TimeWindow::new(f64::NAN, 10.0).is_valid());
        assert!(!TimeWindow::new(10.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_time_window_contains() {
        let tw = TimeWindow::new(10.0, 20.0);
        assert!(tw.contains(10.0));
        assert!(tw.contains(20.0));
        assert!(!tw.contains(9.9));
        assert!(!tw.contains(20.1));
    }

    #[test]
    fn test_time_window_waiting_and_slack() {
        let tw = TimeWindow::new(10.0, 20.0);
        assert!((tw.waiting_time(5.0) - 5.0).abs() < 1e-10);
        assert!(tw.waiting_time(15.0).abs() < 1e-10);
        assert!((tw.slack(15.0) - 5.0).abs() < 1e-10);
        assert!(!tw.is_violated(20.0));
        assert!(tw.is_violated(20.1));
    }

    #[test]
    fn test_depot_and_customer() {
        let d = Node::depot(35.0, 35.0);
        assert!(d.is_depot());
        assert_eq!(d.demand(), 0.0);

        let c = Node::customer(3, 1.0, 2.0, 7.0, 4.0);
        assert!(!c.is_depot());
        assert_eq!(c.id(), 3);
        assert_eq!(c.service_duration(), 4.0);
        assert!(c.time_window().is_none());
    }

    #[test]
    fn test_node_distance() {
        let a = Node::depot(0.0, 0.0);
        let b = Node::customer(1, 3.0, 4.0, 0.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-10);
    }
}
