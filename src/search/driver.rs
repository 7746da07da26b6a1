//! Search driver: construction, improvement, termination.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{SearchBudget, SolverConfig, StopSignal};
use crate::constructive::{default_vehicle_order, greedy_insertion};
use crate::error::SolveError;
use crate::local_search::{LocalSearch, WorkingSolution, IMPROVEMENT_EPSILON};
use crate::models::{Instance, Solution};

/// Lifecycle of a [`SearchDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverState {
    Initializing,
    Constructing,
    Improving,
    Terminated,
}

/// Why the improvement phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// A full scan applied no move.
    Converged,
    IterationLimit,
    TimeLimit,
    /// The stop signal was raised.
    Cancelled,
}

/// The search stopped on its budget rather than by converging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetExhaustedWarning {
    /// [`Termination::IterationLimit`] or [`Termination::TimeLimit`].
    pub reason: Termination,
    pub iterations: usize,
    pub elapsed: Duration,
}

/// Counters collected during a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Index of the start that produced the result (0 for single-start).
    pub start: usize,
    /// Completed scans.
    pub iterations: usize,
    pub moves_applied: usize,
    /// Times the best-so-far solution was replaced.
    pub improvements: usize,
    pub initial_objective: f64,
    pub best_objective: f64,
    pub elapsed: Duration,
    pub termination: Termination,
}

/// Successful result of a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Best solution found, verified against the instance.
    pub solution: Solution,
    pub objective: f64,
    /// Set when the search stopped on its iteration or time limit.
    pub budget_exhausted: Option<BudgetExhaustedWarning>,
    pub statistics: SearchStatistics,
}

pub type SolveResult = Result<SolveOutcome, SolveError>;

/// Runs one search from construction to termination.
///
/// The driver moves through [`DriverState::Initializing`] (instance
/// validation), [`DriverState::Constructing`] (greedy insertion),
/// [`DriverState::Improving`] (local search scans) and
/// [`DriverState::Terminated`]. Budget and stop signal are checked between
/// scans; the best-so-far solution is replaced only on strict improvement
/// and is verified from scratch before it is returned.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Instance, Node, Vehicle};
/// use u_cvrptw::search::{DriverState, SearchDriver, SolverConfig};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 3.0, 0.0, 4.0, 1.0),
///     Node::customer(2, 0.0, 4.0, 4.0, 1.0),
/// ];
/// let instance = Instance::from_coordinates(nodes, Vehicle::new(0, 10.0).replicate(2)).unwrap();
///
/// let mut driver = SearchDriver::new(&instance, SolverConfig::default());
/// let outcome = driver.run().unwrap();
/// assert_eq!(driver.state(), DriverState::Terminated);
/// assert_eq!(outcome.solution.num_served(), 2);
/// ```
pub struct SearchDriver<'a> {
    instance: &'a Instance,
    config: SolverConfig,
    vehicle_order: Vec<usize>,
    stop: StopSignal,
    start: usize,
    state: DriverState,
}

impl<'a> SearchDriver<'a> {
    pub fn new(instance: &'a Instance, config: SolverConfig) -> Self {
        Self {
            instance,
            config,
            vehicle_order: default_vehicle_order(instance),
            stop: StopSignal::new(),
            start: 0,
            state: DriverState::Initializing,
        }
    }

    /// Overrides the vehicle priority used by construction.
    pub fn with_vehicle_order(mut self, vehicle_order: Vec<usize>) -> Self {
        self.vehicle_order = vehicle_order;
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Labels this driver as start `start` of a multi-start run.
    pub fn with_start_index(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// A handle that cancels this driver when stopped.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn transition(&mut self, next: DriverState) {
        info!(start = self.start, from = ?self.state, to = ?next, "driver state");
        self.state = next;
    }

    /// Runs the search to termination.
    #[instrument(
        skip_all,
        fields(
            start = self.start,
            customers = self.instance.num_customers(),
            vehicles = self.instance.num_vehicles(),
            seed = self.config.seed,
        )
    )]
    pub fn run(&mut self) -> SolveResult {
        let result = self.run_phases();
        self.transition(DriverState::Terminated);
        result
    }

    fn run_phases(&mut self) -> SolveResult {
        let started = Instant::now();
        let instance = self.instance;

        self.state = DriverState::Initializing;
        instance.validate()?;

        self.transition(DriverState::Constructing);
        let initial = greedy_insertion(instance, &self.vehicle_order).inspect_err(|err| {
            warn!(customers = ?err.customer_ids, "construction failed");
        })?;
        let mut working = WorkingSolution::from_solution(instance, &initial)?;
        let mut best = working.clone();
        let initial_objective = working.objective();
        info!(
            objective = initial_objective,
            routes = working.num_used(),
            "initial solution constructed"
        );

        self.transition(DriverState::Improving);
        let search = LocalSearch::new(self.config.local_search.clone());
        let mut acceptor = self.config.acceptance.build();
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let budget: SearchBudget = self.config.budget;

        let mut iterations = 0;
        let mut moves_applied = 0;
        let mut improvements = 0;
        let termination = loop {
            if self.stop.is_stopped() {
                break Termination::Cancelled;
            }
            if budget.max_iterations.is_some_and(|max| iterations >= max) {
                break Termination::IterationLimit;
            }
            if budget.time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                break Termination::TimeLimit;
            }

            let applied = search.scan(instance, &mut working, acceptor.as_mut(), &mut rng);
            iterations += 1;
            if applied.is_none() {
                break Termination::Converged;
            }
            moves_applied += 1;
            acceptor.end_iteration();

            if working.objective() < best.objective() - IMPROVEMENT_EPSILON {
                best = working.clone();
                improvements += 1;
                debug!(
                    iteration = iterations,
                    objective = best.objective(),
                    "new best solution"
                );
            }
        };

        let solution = best.to_solution(instance)?;
        solution.verify(instance)?;

        let elapsed = started.elapsed();
        let budget_exhausted = match termination {
            Termination::IterationLimit | Termination::TimeLimit => Some(BudgetExhaustedWarning {
                reason: termination,
                iterations,
                elapsed,
            }),
            Termination::Converged | Termination::Cancelled => None,
        };
        if budget_exhausted.is_some() {
            warn!(?termination, iterations, "search budget exhausted");
        }

        let objective = solution.total_cost();
        info!(
            objective,
            routes = solution.num_routes(),
            iterations,
            ?termination,
            "search finished"
        );

        Ok(SolveOutcome {
            solution,
            objective,
            budget_exhausted,
            statistics: SearchStatistics {
                start: self.start,
                iterations,
                moves_applied,
                improvements,
                initial_objective,
                best_objective: objective,
                elapsed,
                termination,
            },
        })
    }
}

/// Solves `instance` with the default configuration and the given budget.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Instance, Node, Vehicle};
/// use u_cvrptw::search::{solve, SearchBudget};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 1.0, 0.0, 5.0, 0.0),
///     Node::customer(2, 2.0, 0.0, 5.0, 0.0),
///     Node::customer(3, 0.0, 1.0, 5.0, 0.0),
///     Node::customer(4, 0.0, 2.0, 5.0, 0.0),
/// ];
/// let instance = Instance::from_coordinates(nodes, Vehicle::new(0, 10.0).replicate(4)).unwrap();
///
/// let outcome = solve(&instance, SearchBudget::iterations(1000)).unwrap();
/// assert!(outcome.solution.num_routes() >= 2);
/// assert!(outcome.solution.routes().iter().all(|r| r.total_load() <= 10.0));
/// ```
pub fn solve(instance: &Instance, budget: SearchBudget) -> SolveResult {
    solve_with_config(instance, &SolverConfig::default().with_budget(budget))
}

/// Solves `instance` with an explicit configuration.
pub fn solve_with_config(instance: &Instance, config: &SolverConfig) -> SolveResult {
    SearchDriver::new(instance, config.clone()).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InvalidInstanceError, SolveError};
    use crate::models::{Node, TimeWindow, Vehicle};
    use crate::search::AcceptanceConfig;

    fn instance() -> Instance {
        let nodes = vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 2.0, 1.0, 3.0, 1.0),
            Node::customer(2, -1.0, 3.0, 4.0, 1.0),
            Node::customer(3, 3.0, -2.0, 2.0, 1.0).with_time_window(TimeWindow::new(0.0, 30.0)),
            Node::customer(4, -3.0, -3.0, 5.0, 1.0),
            Node::customer(5, 1.0, 4.0, 3.0, 1.0),
            Node::customer(6, 4.0, 4.0, 2.0, 1.0).with_time_window(TimeWindow::new(5.0, 40.0)),
        ];
        let vehicles = Vehicle::new(0, 10.0).with_fixed_cost(10.0).replicate(3);
        Instance::from_coordinates(nodes, vehicles).expect("valid")
    }

    #[test]
    fn test_converges_and_verifies() {
        let inst = instance();
        let outcome = solve(&inst, SearchBudget::unlimited()).expect("solvable");
        assert!(outcome.solution.verify(&inst).is_ok());
        assert_eq!(outcome.statistics.termination, Termination::Converged);
        assert!(outcome.budget_exhausted.is_none());
        assert!(outcome.objective <= outcome.statistics.initial_objective + 1e-9);
        assert!((outcome.objective - outcome.solution.total_cost()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_iterations_returns_construction() {
        let inst = instance();
        let outcome = solve(&inst, SearchBudget::iterations(0)).expect("solvable");
        let warning = outcome.budget_exhausted.expect("budget warning");
        assert_eq!(warning.reason, Termination::IterationLimit);
        assert_eq!(warning.iterations, 0);
        assert!((outcome.objective - outcome.statistics.initial_objective).abs() < 1e-9);
    }

    #[test]
    fn test_cancelled_before_start() {
        let inst = instance();
        let stop = StopSignal::new();
        stop.stop();
        let mut driver = SearchDriver::new(&inst, SolverConfig::default()).with_stop_signal(stop);
        let outcome = driver.run().expect("construction succeeds");
        assert_eq!(outcome.statistics.termination, Termination::Cancelled);
        assert!(outcome.budget_exhausted.is_none());
        assert!(outcome.solution.verify(&inst).is_ok());
    }

    #[test]
    fn test_construction_failure_terminates() {
        let nodes = vec![Node::depot(0.0, 0.0), Node::customer(1, 1.0, 0.0, 8.0, 0.0)];
        let vehicles = vec![Vehicle::new(0, 10.0).with_demand_bounds(0.0, 5.0)];
        let inst = Instance::from_coordinates(nodes, vehicles).expect("valid");
        let mut driver = SearchDriver::new(&inst, SolverConfig::default());
        let err = driver.run().unwrap_err();
        assert!(matches!(err, SolveError::NoFeasibleConstruction(_)));
        assert_eq!(driver.state(), DriverState::Terminated);
    }

    #[test]
    fn test_invalid_instance_error_converts() {
        let err: SolveError = InvalidInstanceError::EmptyFleet.into();
        assert!(matches!(err, SolveError::InvalidInstance(_)));
    }

    #[test]
    fn test_annealing_never_returns_worse_than_initial() {
        let inst = instance();
        let config = SolverConfig::default()
            .with_budget(SearchBudget::iterations(300))
            .with_acceptance(AcceptanceConfig::SimulatedAnnealing {
                initial_temperature: 20.0,
                cooling_rate: 0.97,
                max_uphill: 15.0,
            })
            .with_seed(3);
        let outcome = solve_with_config(&inst, &config).expect("solvable");
        assert!(outcome.objective <= outcome.statistics.initial_objective + 1e-9);
        assert!(outcome.solution.verify(&inst).is_ok());
    }

    #[test]
    fn test_deterministic_for_seed() {
        let inst = instance();
        let config = SolverConfig::default()
            .with_budget(SearchBudget::iterations(200))
            .with_acceptance(AcceptanceConfig::SimulatedAnnealing {
                initial_temperature: 10.0,
                cooling_rate: 0.95,
                max_uphill: 10.0,
            })
            .with_seed(42);
        let a = solve_with_config(&inst, &config).expect("solvable");
        let b = solve_with_config(&inst, &config).expect("solvable");
        assert_eq!(a.solution, b.solution);
        assert_eq!(a.statistics.iterations, b.statistics.iterations);
    }
}
