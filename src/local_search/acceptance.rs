//! Move acceptance criteria.

use rand::{Rng, RngCore};

/// Cost decrease a move must exceed to count as an improvement.
pub const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Below this temperature annealing only accepts improvements.
const FROZEN_TEMPERATURE: f64 = 1e-6;

/// Decides whether a feasible move with a given cost delta is applied.
///
/// Negative deltas decrease the objective.
pub trait Acceptor {
    /// Largest delta that could currently be accepted; moves whose estimated
    /// delta exceeds it are pruned before feasibility checks.
    fn threshold(&self) -> f64;

    /// Returns `true` if a move with `delta` should be applied.
    fn accept(&mut self, delta: f64, rng: &mut dyn RngCore) -> bool;

    /// Called by the search driver once per completed scan.
    fn end_iteration(&mut self) {}
}

/// Accepts strictly improving moves only.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAcceptor;

impl Acceptor for GreedyAcceptor {
    fn threshold(&self) -> f64 {
        -IMPROVEMENT_EPSILON
    }

    fn accept(&mut self, delta: f64, _rng: &mut dyn RngCore) -> bool {
        delta < -IMPROVEMENT_EPSILON
    }
}

/// Metropolis acceptance with geometric cooling.
///
/// Improving moves are always accepted. A worsening move with delta `Δ` is
/// accepted with probability `exp(-Δ / T)` provided `Δ <= max_uphill`; the
/// temperature `T` is multiplied by the cooling rate after every scan. Once
/// the temperature drops below `1e-6` the acceptor behaves greedily, so a
/// cooling rate below one lets an unbounded search converge.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealingAcceptor {
    temperature: f64,
    cooling_rate: f64,
    max_uphill: f64,
}

impl SimulatedAnnealingAcceptor {
    pub fn new(initial_temperature: f64, cooling_rate: f64, max_uphill: f64) -> Self {
        Self {
            temperature: initial_temperature.max(0.0),
            cooling_rate: cooling_rate.clamp(0.0, 1.0),
            max_uphill: max_uphill.max(0.0),
        }
    }

    /// Current temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Largest worsening a single move may introduce.
    pub fn max_uphill(&self) -> f64 {
        self.max_uphill
    }

    /// Returns `true` once only improving moves are accepted.
    pub fn is_frozen(&self) -> bool {
        self.temperature < FROZEN_TEMPERATURE
    }
}

impl Acceptor for SimulatedAnnealingAcceptor {
    fn threshold(&self) -> f64 {
        if !self.is_frozen() {
            self.max_uphill
        } else {
            -IMPROVEMENT_EPSILON
        }
    }

    fn accept(&mut self, delta: f64, rng: &mut dyn RngCore) -> bool {
        if delta < -IMPROVEMENT_EPSILON {
            return true;
        }
        if delta > self.max_uphill || self.is_frozen() {
            return false;
        }
        let probability = (-delta.max(0.0) / self.temperature).exp();
        rng.random::<f64>() < probability
    }

    fn end_iteration(&mut self) {
        self.temperature *= self.cooling_rate;
    }
}
