//! Error types surfaced to callers of the engine.

use serde::Serialize;
use thiserror::Error;

use crate::evaluation::Infeasibility;

/// Malformed node or vehicle data, detected before any search.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum InvalidInstanceError {
    #[error("instance has no depot node")]
    MissingDepot,
    #[error("node at index {index} has id {id}; node ids must equal their index")]
    NodeIdMismatch { index: usize, id: usize },
    #[error("depot demand must be zero, got {demand}")]
    DepotDemand { demand: f64 },
    #[error("node {node_id} has invalid demand {demand}")]
    InvalidDemand { node_id: usize, demand: f64 },
    #[error("node {node_id} has invalid service duration {duration}")]
    InvalidServiceDuration { node_id: usize, duration: f64 },
    #[error("node {node_id} has an invalid time window [{earliest}, {latest}]")]
    InvertedTimeWindow {
        node_id: usize,
        earliest: f64,
        latest: f64,
    },
    #[error("vehicle at index {index} has id {id}; vehicle ids must equal their index")]
    VehicleIdMismatch { index: usize, id: usize },
    #[error("vehicle {vehicle_id} has invalid capacity {capacity}")]
    InvalidCapacity { vehicle_id: usize, capacity: f64 },
    #[error("vehicle {vehicle_id} has invalid speed {speed}")]
    InvalidSpeed { vehicle_id: usize, speed: f64 },
    #[error("vehicle {vehicle_id} has inverted demand bounds [{min}, {max}]")]
    InvertedDemandBounds { vehicle_id: usize, min: f64, max: f64 },
    #[error("vehicle {vehicle_id} has negative {parameter} ({value})")]
    NegativeParameter {
        vehicle_id: usize,
        parameter: &'static str,
        value: f64,
    },
    #[error("instance has customers but no vehicles")]
    EmptyFleet,
    #[error("customer {node_id} demand {demand} exceeds the largest capacity {max_capacity}")]
    DemandExceedsFleet {
        node_id: usize,
        demand: f64,
        max_capacity: f64,
    },
    #[error("distance matrix of size {size} holds {entries} entries")]
    MalformedMatrix { size: usize, entries: usize },
    #[error("distance matrix has size {actual}, expected {expected}")]
    MatrixSizeMismatch { expected: usize, actual: usize },
    #[error("distance from {from} to {to} is invalid ({distance})")]
    InvalidDistance { from: usize, to: usize, distance: f64 },
    #[error("planning horizon must be positive and finite, got {horizon}")]
    InvalidHorizon { horizon: f64 },
    #[error("depot window [{earliest}, {latest}] does not overlap the planning horizon [0, {horizon}]")]
    DepotWindowOutsideHorizon {
        earliest: f64,
        latest: f64,
        horizon: f64,
    },
    #[error("waiting limit must be non-negative, got {max_waiting}")]
    InvalidWaitingLimit { max_waiting: f64 },
}

/// Why a vehicle could not take a customer during construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RejectionReason {
    /// The customer alone on this vehicle already violates a constraint.
    Infeasible(Infeasibility),
    /// The customer would fit alone, but the vehicle's route had no room left.
    RouteExhausted,
}

/// A single vehicle's verdict for an unplaced customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRejection {
    pub vehicle_id: usize,
    pub reason: RejectionReason,
}

/// Diagnosis for one customer left unassigned by construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDiagnosis {
    pub customer_id: usize,
    pub rejections: Vec<VehicleRejection>,
}

impl CustomerDiagnosis {
    /// Returns `true` if no vehicle could serve this customer even alone.
    pub fn is_unservable(&self) -> bool {
        self.rejections
            .iter()
            .all(|r| matches!(r.reason, RejectionReason::Infeasible(_)))
    }
}

/// Some customers could not be placed by any vehicle.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("no feasible construction: customers {customer_ids:?} could not be placed")]
pub struct NoFeasibleConstructionError {
    pub customer_ids: Vec<usize>,
    pub diagnoses: Vec<CustomerDiagnosis>,
}

impl NoFeasibleConstructionError {
    /// Diagnosis for a given customer, if it was left unassigned.
    pub fn diagnosis(&self, customer_id: usize) -> Option<&CustomerDiagnosis> {
        self.diagnoses.iter().find(|d| d.customer_id == customer_id)
    }
}

/// A solution failed from-scratch verification.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SolutionDefect {
    #[error("customer {customer_id} is not served")]
    MissingCustomer { customer_id: usize },
    #[error("customer {customer_id} is served more than once")]
    DuplicateCustomer { customer_id: usize },
    #[error("route visits unknown customer node {node_id}")]
    UnknownCustomer { node_id: usize },
    #[error("route uses unknown vehicle {vehicle_id}")]
    UnknownVehicle { vehicle_id: usize },
    #[error("vehicle {vehicle_id} serves more than one route")]
    VehicleReused { vehicle_id: usize },
    #[error("route of vehicle {vehicle_id} is infeasible: {cause}")]
    InfeasibleRoute {
        vehicle_id: usize,
        cause: Infeasibility,
    },
    #[error("route of vehicle {vehicle_id} stores cost {stored}, recomputed {recomputed}")]
    CostMismatch {
        vehicle_id: usize,
        stored: f64,
        recomputed: f64,
    },
    #[error("solution stores objective {stored}, recomputed {recomputed}")]
    ObjectiveMismatch { stored: f64, recomputed: f64 },
}

/// Failure of a solve call.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SolveError {
    #[error("invalid instance: {0}")]
    InvalidInstance(#[from] InvalidInstanceError),
    #[error(transparent)]
    NoFeasibleConstruction(#[from] NoFeasibleConstructionError),
    #[error("search produced a solution that failed verification: {0}")]
    SolutionRejected(#[from] SolutionDefect),
}
