use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use u_cvrptw::constructive::{default_vehicle_order, greedy_insertion};
use u_cvrptw::evaluation::RouteEvaluator;
use u_cvrptw::local_search::{GreedyAcceptor, LocalSearch, LocalSearchConfig, WorkingSolution};
use u_cvrptw::models::{Instance, Node, Solution, TimeWindow, Vehicle};
use u_cvrptw::search::{solve, SearchBudget};
use u_cvrptw::SolveError;

const TOL: f64 = 1e-6;

type CustomerSpec = (f64, f64, u32, u32, Option<(u32, u32)>);
type VehicleSpec = (u32, u32, usize);

fn build_instance(customers: Vec<CustomerSpec>, fleet: Vec<VehicleSpec>) -> Instance {
    let mut nodes = vec![Node::depot(0.0, 0.0)];
    for (i, (x, y, demand, service, window)) in customers.into_iter().enumerate() {
        let mut node = Node::customer(i + 1, x, y, f64::from(demand), f64::from(service));
        if let Some((earliest, width)) = window {
            node = node.with_time_window(TimeWindow::new(
                f64::from(earliest),
                f64::from(earliest + width),
            ));
        }
        nodes.push(node);
    }

    let mut vehicles = Vec::new();
    for (capacity, fixed, count) in fleet {
        let unit = Vehicle::new(vehicles.len(), f64::from(capacity)).with_fixed_cost(f64::from(fixed));
        vehicles.extend(unit.replicate(count));
    }
    Instance::from_coordinates(nodes, vehicles).expect("generated instance is valid")
}

fn instance_strategy() -> impl Strategy<Value = Instance> {
    (1usize..=8, 1usize..=3)
        .prop_flat_map(|(n, kinds)| {
            (
                prop::collection::vec(
                    (
                        -20.0..20.0f64,
                        -20.0..20.0f64,
                        1u32..=10,
                        0u32..=3,
                        prop::option::of((0u32..100, 30u32..200)),
                    ),
                    n,
                ),
                prop::collection::vec((10u32..=30, 0u32..=50, 1usize..=3), kinds),
            )
        })
        .prop_map(|(customers, fleet)| build_instance(customers, fleet))
}

fn assert_feasible(instance: &Instance, solution: &Solution) {
    // Partition
    let mut served = vec![0usize; instance.num_nodes()];
    for route in solution.routes() {
        for visit in route.visits() {
            served[visit.node_id] += 1;
        }
    }
    assert!(served[1..].iter().all(|&count| count == 1));

    let mut used = vec![false; instance.num_vehicles()];
    for route in solution.routes() {
        assert!(!used[route.vehicle_id()]);
        used[route.vehicle_id()] = true;

        let vehicle = instance.vehicle(route.vehicle_id());
        assert!(route.total_load() <= vehicle.capacity() + TOL);
        for visit in route.visits() {
            assert!(visit.load_after <= vehicle.capacity() + TOL);
            if let Some(tw) = instance.node(visit.node_id).time_window() {
                assert!(visit.arrival_time <= tw.latest() + TOL);
                assert!(visit.start_time >= tw.earliest() - TOL);
            }
        }
    }

    let recomputed: f64 = solution.routes().iter().map(|r| r.cost()).sum();
    assert!((recomputed - solution.total_cost()).abs() < TOL);
    assert!(solution.verify(instance).is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn solutions_are_feasible_partitions(instance in instance_strategy()) {
        match solve(&instance, SearchBudget::iterations(200)) {
            Ok(outcome) => {
                assert_feasible(&instance, &outcome.solution);
                prop_assert!(outcome.objective <= outcome.statistics.initial_objective + TOL);
            }
            Err(SolveError::NoFeasibleConstruction(err)) => {
                prop_assert!(!err.customer_ids.is_empty());
                prop_assert_eq!(err.customer_ids.len(), err.diagnoses.len());
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn construction_is_feasible_when_it_succeeds(instance in instance_strategy()) {
        if let Ok(solution) = greedy_insertion(&instance, &default_vehicle_order(&instance)) {
            assert_feasible(&instance, &solution);
        }
    }

    #[test]
    fn applied_moves_match_recomputed_objective(instance in instance_strategy()) {
        let Ok(initial) = greedy_insertion(&instance, &default_vehicle_order(&instance)) else {
            return Ok(());
        };
        let mut working = WorkingSolution::from_solution(&instance, &initial).expect("verified");
        let search = LocalSearch::new(LocalSearchConfig::default());
        let mut rng = SmallRng::seed_from_u64(0);

        for _ in 0..50 {
            let before = working.objective();
            let Some(applied) = search.scan(&instance, &mut working, &mut GreedyAcceptor, &mut rng) else {
                break;
            };
            prop_assert!(applied.delta < 0.0);
            prop_assert!((working.objective() - (before + applied.delta)).abs() < TOL);

            let recomputed: f64 = working
                .routes()
                .iter()
                .enumerate()
                .map(|(vid, r)| {
                    RouteEvaluator::new(&instance, vid)
                        .check(r.customers())
                        .expect("routes stay feasible")
                        .cost
                })
                .sum();
            prop_assert!((recomputed - working.objective()).abs() < TOL);
        }
    }

    #[test]
    fn search_is_deterministic(instance in instance_strategy()) {
        let a = solve(&instance, SearchBudget::iterations(100));
        let b = solve(&instance, SearchBudget::iterations(100));
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.solution, b.solution);
                prop_assert_eq!(a.statistics.iterations, b.statistics.iterations);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "runs disagree on feasibility"),
        }
    }
}
