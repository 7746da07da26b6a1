//! Feasibility verdicts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The first constraint a candidate route violates.
///
/// Variants are listed in the order the evaluator checks them.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Infeasibility {
    /// Cumulative load exceeds capacity when reaching `customer_id`.
    #[error("load {load} exceeds capacity {capacity} at customer {customer_id}")]
    CapacityExceeded {
        customer_id: usize,
        load: f64,
        capacity: f64,
    },
    /// Customer demand outside the vehicle's per-customer bounds.
    #[error("demand {demand} of customer {customer_id} outside vehicle bounds (min {min}, max {max:?})")]
    DemandOutOfBounds {
        customer_id: usize,
        demand: f64,
        min: f64,
        max: Option<f64>,
    },
    /// The departure needed to reach the first customer is after the depot closes.
    #[error("departure {departure} after the depot closes at {closes}")]
    DepotClosed { departure: f64, closes: f64 },
    /// Arrival after the customer's window closes.
    #[error("arrival {arrival} at customer {customer_id} after window closes at {latest}")]
    TimeWindowViolated {
        customer_id: usize,
        arrival: f64,
        latest: f64,
    },
    /// Waiting for the window to open exceeds the instance waiting limit.
    #[error("waiting {waiting} at customer {customer_id} exceeds limit {max_waiting}")]
    ExcessiveWaiting {
        customer_id: usize,
        waiting: f64,
        max_waiting: f64,
    },
    #[error("route distance {distance} exceeds maximum {max_distance}")]
    MaxDistanceExceeded { distance: f64, max_distance: f64 },
    #[error("route duration {duration} exceeds maximum {max_duration}")]
    MaxDurationExceeded { duration: f64, max_duration: f64 },
    /// Return to the depot after the end of the planning horizon.
    #[error("return {return_time} after the planning horizon ends at {horizon}")]
    HorizonExceeded { return_time: f64, horizon: f64 },
    #[error("route serves {count} customers, maximum is {max_customers}")]
    MaxCustomersExceeded { count: usize, max_customers: usize },
}

impl Infeasibility {
    /// The customer the violation is attributed to, for per-stop violations.
    pub fn customer_id(&self) -> Option<usize> {
        match self {
            Infeasibility::CapacityExceeded { customer_id, .. }
            | Infeasibility::DemandOutOfBounds { customer_id, .. }
            | Infeasibility::TimeWindowViolated { customer_id, .. }
            | Infeasibility::ExcessiveWaiting { customer_id, .. } => Some(*customer_id),
            Infeasibility::DepotClosed { .. }
            | Infeasibility::MaxDistanceExceeded { .. }
            | Infeasibility::MaxDurationExceeded { .. }
            | Infeasibility::HorizonExceeded { .. }
            | Infeasibility::MaxCustomersExceeded { .. } => None,
        }
    }
}
