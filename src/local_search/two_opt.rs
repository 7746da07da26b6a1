//! Intra-route 2-opt.
//!
//! # Algorithm
//!
//! For each segment `r[i..=j]` of a route, reversing it replaces the edges
//! `(prev, r[i])` and `(r[j], next)` with `(prev, r[j])` and `(r[i], next)`:
//!
//! ```text
//! delta = d(prev, r[j]) + d(r[i], next) - d(prev, r[i]) - d(r[j], next)
//!       + reversed(r[i..=j]) - forward(r[i..=j])
//! ```
//!
//! The last term is zero for a symmetric matrix; for asymmetric distances
//! both inner path lengths are accumulated as `j` grows, so the distance
//! change stays exact.
//!
//! # Complexity
//!
//! O(n²) per route.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use std::ops::ControlFlow;

use super::engine::ScanContext;
use super::{arc, node_at, node_before, Move};

pub(super) fn scan(ctx: &mut ScanContext<'_>) -> ControlFlow<()> {
    let instance = ctx.instance();
    let working = ctx.working();

    for (vehicle, state) in working.routes().iter().enumerate() {
        let route = state.customers();
        let n = route.len();
        if n < 2 {
            continue;
        }

        for i in 0..n - 1 {
            let prev = node_before(route, i);
            let mut forward = 0.0;
            let mut backward = 0.0;
            for j in i + 1..n {
                forward += arc(instance, route[j - 1], route[j]);
                backward += arc(instance, route[j], route[j - 1]);
                let next = node_at(route, j + 1);

                let delta = arc(instance, prev, route[j]) + arc(instance, route[i], next)
                    - arc(instance, prev, route[i])
                    - arc(instance, route[j], next)
                    + backward
                    - forward;
                let estimate = ctx.cost_change(vehicle, state.distance() + delta, n);
                ctx.consider(Move::TwoOpt { vehicle, from: i, to: j }, estimate)?;
            }
        }
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use crate::distance::DistanceMatrix;
    use crate::local_search::{
        GreedyAcceptor, LocalSearch, LocalSearchConfig, Move, Neighborhood, WorkingSolution,
    };
    use crate::models::{Instance, Node, Solution, Vehicle};
    use crate::evaluation::RouteEvaluator;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn only_two_opt() -> LocalSearch {
        LocalSearch::new(LocalSearchConfig::default().with_neighborhoods(vec![Neighborhood::TwoOpt]))
    }

    fn working_with(inst: &Instance, customers: &[usize]) -> WorkingSolution {
        let mut sol = Solution::new();
        sol.add_route(RouteEvaluator::new(inst, 0).build_route(customers).expect("feasible"));
        WorkingSolution::from_solution(inst, &sol).expect("verified")
    }

    #[test]
    fn test_uncrosses_line() {
        let nodes = vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 1.0, 0.0, 1.0, 0.0),
            Node::customer(2, 2.0, 0.0, 1.0, 0.0),
            Node::customer(3, 3.0, 0.0, 1.0, 0.0),
        ];
        let inst = Instance::from_coordinates(nodes, vec![Vehicle::new(0, 10.0)]).expect("valid");
        let mut working = working_with(&inst, &[1, 3, 2]);
        let mut rng = SmallRng::seed_from_u64(0);

        only_two_opt().improve(&inst, &mut working, &mut GreedyAcceptor, &mut rng, 100);
        // optimal: 0→1→2→3→0 = 6
        assert!((working.route(0).distance() - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_asymmetric_reversal_is_exact() {
        // Going "forward" along ids is cheap, backwards is expensive.
        let distances = DistanceMatrix::from_fn(4, |i, j| if j > i { 1.0 } else { 5.0 });
        let nodes = vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 0.0, 0.0, 1.0, 0.0),
            Node::customer(2, 0.0, 0.0, 1.0, 0.0),
            Node::customer(3, 0.0, 0.0, 1.0, 0.0),
        ];
        let inst = Instance::new(nodes, vec![Vehicle::new(0, 10.0)], distances).expect("valid");
        assert!(!inst.is_symmetric());

        let mut working = working_with(&inst, &[3, 2, 1]);
        let before = working.objective();
        let mut rng = SmallRng::seed_from_u64(0);
        let applied = only_two_opt()
            .scan(&inst, &mut working, &mut GreedyAcceptor, &mut rng)
            .expect("reversal improves");
        assert!(matches!(applied.operation, Move::TwoOpt { vehicle: 0, .. }));
        assert!((working.objective() - (before + applied.delta)).abs() < 1e-9);
        let recomputed = RouteEvaluator::new(&inst, 0)
            .check(working.route(0).customers())
            .expect("feasible");
        assert!((recomputed.cost - working.objective()).abs() < 1e-9);
    }
}
