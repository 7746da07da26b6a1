//! Solver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::local_search::{
    Acceptor, GreedyAcceptor, LocalSearchConfig, SimulatedAnnealingAcceptor,
};

/// Limits on the improvement phase, checked between scans.
///
/// `None` means unlimited; with both limits unset the search runs until
/// convergence or cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBudget {
    /// Maximum number of scans.
    pub max_iterations: Option<usize>,
    /// Wall-clock limit measured from the start of the solve.
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    /// No limit besides convergence.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Budget of `max_iterations` scans.
    pub fn iterations(max_iterations: usize) -> Self {
        Self {
            max_iterations: Some(max_iterations),
            time_limit: None,
        }
    }

    /// Budget of `limit` wall-clock time.
    pub fn time(limit: Duration) -> Self {
        Self {
            max_iterations: None,
            time_limit: Some(limit),
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Acceptance criterion used by the improvement phase.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AcceptanceConfig {
    /// Strict improvements only.
    #[default]
    Greedy,
    /// Metropolis acceptance of bounded worsening moves.
    SimulatedAnnealing {
        initial_temperature: f64,
        /// Multiplier applied to the temperature after every scan.
        cooling_rate: f64,
        /// Largest worsening accepted for a single move.
        max_uphill: f64,
    },
}

impl AcceptanceConfig {
    /// Creates a fresh acceptor in its initial state.
    pub fn build(&self) -> Box<dyn Acceptor> {
        match *self {
            AcceptanceConfig::Greedy => Box::new(GreedyAcceptor),
            AcceptanceConfig::SimulatedAnnealing {
                initial_temperature,
                cooling_rate,
                max_uphill,
            } => Box::new(SimulatedAnnealingAcceptor::new(
                initial_temperature,
                cooling_rate,
                max_uphill,
            )),
        }
    }
}

/// Complete configuration of a solve.
///
/// # Examples
///
/// ```
/// use u_cvrptw::search::{AcceptanceConfig, SearchBudget, SolverConfig};
///
/// let config = SolverConfig::default()
///     .with_budget(SearchBudget::iterations(500))
///     .with_acceptance(AcceptanceConfig::SimulatedAnnealing {
///         initial_temperature: 10.0,
///         cooling_rate: 0.99,
///         max_uphill: 25.0,
///     })
///     .with_seed(7);
/// assert_eq!(config.budget.max_iterations, Some(500));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub budget: SearchBudget,
    pub local_search: LocalSearchConfig,
    pub acceptance: AcceptanceConfig,
    /// Seed of the search's random number generator.
    pub seed: u64,
}

impl SolverConfig {
    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_local_search(mut self, local_search: LocalSearchConfig) -> Self {
        self.local_search = local_search;
        self
    }

    pub fn with_acceptance(mut self, acceptance: AcceptanceConfig) -> Self {
        self.acceptance = acceptance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
