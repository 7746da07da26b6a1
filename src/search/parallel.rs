//! Independent multi-start search on the rayon thread pool.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{info, instrument};

use super::{SearchDriver, SolveResult, SolverConfig, StopSignal};
use crate::constructive::{default_vehicle_order, shuffled_vehicle_order};
use crate::models::Instance;

/// Runs `starts` independent searches in parallel and returns the best.
///
/// Start `k` seeds its generator with `config.seed + k`. Starts after the
/// first also shuffle the neighborhood order and the priority of vehicles
/// with equal fixed cost. The lowest objective wins, ties going to the
/// lowest start index, so the result is deterministic for an iteration-only
/// budget. If every start fails, the error of start 0 is returned.
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::{Instance, Node, Vehicle};
/// use u_cvrptw::search::{solve_parallel, SearchBudget, SolverConfig};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 1.0, 2.0, 3.0, 0.0),
///     Node::customer(2, -2.0, 1.0, 3.0, 0.0),
///     Node::customer(3, 2.0, -1.0, 3.0, 0.0),
/// ];
/// let instance = Instance::from_coordinates(nodes, Vehicle::new(0, 6.0).replicate(3)).unwrap();
/// let config = SolverConfig::default().with_budget(SearchBudget::iterations(100));
///
/// let outcome = solve_parallel(&instance, &config, 4).unwrap();
/// assert_eq!(outcome.solution.num_served(), 3);
/// ```
pub fn solve_parallel(instance: &Instance, config: &SolverConfig, starts: usize) -> SolveResult {
    solve_parallel_with_stop(instance, config, starts, &StopSignal::new())
}

/// [`solve_parallel`] with a stop signal shared by every start.
#[instrument(skip(instance, config, stop), fields(seed = config.seed))]
pub fn solve_parallel_with_stop(
    instance: &Instance,
    config: &SolverConfig,
    starts: usize,
    stop: &StopSignal,
) -> SolveResult {
    let starts = starts.max(1);
    let results: Vec<SolveResult> = (0..starts)
        .into_par_iter()
        .map(|k| driver_for_start(instance, config, stop, k).run())
        .collect();

    let mut results = results.into_iter();
    let first = match results.next() {
        Some(result) => result,
        None => driver_for_start(instance, config, stop, 0).run(),
    };
    let best = results.fold(first, |best, result| match (best, result) {
        (Ok(current), Ok(candidate)) if candidate.objective < current.objective => Ok(candidate),
        (Ok(current), _) => Ok(current),
        (Err(_), Ok(candidate)) => Ok(candidate),
        (Err(err), Err(_)) => Err(err),
    });

    if let Ok(outcome) = &best {
        info!(
            winner = outcome.statistics.start,
            objective = outcome.objective,
            "multi-start finished"
        );
    }
    best
}

fn driver_for_start<'a>(
    instance: &'a Instance,
    config: &SolverConfig,
    stop: &StopSignal,
    k: usize,
) -> SearchDriver<'a> {
    let seed = config.seed.wrapping_add(k as u64);
    let mut config = config.clone().with_seed(seed);
    let mut vehicle_order = default_vehicle_order(instance);
    if k > 0 {
        let mut rng = SmallRng::seed_from_u64(seed);
        config.local_search.neighborhoods.shuffle(&mut rng);
        vehicle_order = shuffled_vehicle_order(instance, &mut rng);
    }
    SearchDriver::new(instance, config)
        .with_vehicle_order(vehicle_order)
        .with_stop_signal(stop.clone())
        .with_start_index(k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, Vehicle};
    use crate::search::{solve_with_config, SearchBudget};

    fn instance() -> Instance {
        let nodes = vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 3.0, 1.0, 4.0, 0.0),
            Node::customer(2, -2.0, 2.0, 3.0, 0.0),
            Node::customer(3, 1.0, -3.0, 5.0, 0.0),
            Node::customer(4, -1.0, -1.0, 2.0, 0.0),
            Node::customer(5, 2.0, 3.0, 4.0, 0.0),
        ];
        let vehicles = Vehicle::new(0, 10.0).with_fixed_cost(2.0).replicate(3);
        Instance::from_coordinates(nodes, vehicles).expect("valid")
    }

    #[test]
    fn test_not_worse_than_single_start() {
        let inst = instance();
        let config = SolverConfig::default().with_budget(SearchBudget::iterations(200));
        let single = solve_with_config(&inst, &config).expect("solvable");
        let multi = solve_parallel(&inst, &config, 4).expect("solvable");
        assert!(multi.objective <= single.objective + 1e-9);
        assert!(multi.solution.verify(&inst).is_ok());
    }

    #[test]
    fn test_deterministic_winner() {
        let inst = instance();
        let config = SolverConfig::default()
            .with_budget(SearchBudget::iterations(100))
            .with_seed(5);
        let a = solve_parallel(&inst, &config, 3).expect("solvable");
        let b = solve_parallel(&inst, &config, 3).expect("solvable");
        assert_eq!(a.statistics.start, b.statistics.start);
        assert_eq!(a.solution, b.solution);
    }

    #[test]
    fn test_zero_starts_runs_one() {
        let inst = instance();
        let config = SolverConfig::default().with_budget(SearchBudget::iterations(10));
        let outcome = solve_parallel(&inst, &config, 0).expect("solvable");
        assert_eq!(outcome.statistics.start, 0);
    }

    #[test]
    fn test_all_starts_fail() {
        let nodes = vec![Node::depot(0.0, 0.0), Node::customer(1, 1.0, 0.0, 8.0, 0.0)];
        let vehicles = vec![Vehicle::new(0, 10.0).with_max_distance(1.0)];
        let inst = Instance::from_coordinates(nodes, vehicles).expect("valid");
        let err = solve_parallel(&inst, &SolverConfig::default(), 2).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SolveError::NoFeasibleConstruction(_)
        ));
    }
}
