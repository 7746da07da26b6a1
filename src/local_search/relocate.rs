//! Inter-route segment relocation.
//!
//! # Algorithm
//!
//! Moves a segment of 1 to `max_segment_len` consecutive customers from its
//! route to any position of another vehicle's route. The target may be an
//! unused vehicle, which opens a new route; emptying the source closes one.
//! Capacity and demand bounds of the target are screened before the
//! distance change is computed.
//!
//! # Complexity
//!
//! O(k · n² · V) per scan, where k = maximum segment length, n = customers,
//! V = vehicles.
//!
//! # Reference
//!
//! Savelsbergh, M.W.P. (1992). "The Vehicle Routing Problem with Time
//! Windows: Minimizing Route Duration", *ORSA Journal on Computing* 4(2).

use std::ops::ControlFlow;

use super::engine::ScanContext;
use super::{arc, node_at, node_before, Move};
use crate::evaluation::FEASIBILITY_TOLERANCE;

pub(super) fn scan(ctx: &mut ScanContext<'_>) -> ControlFlow<()> {
    let instance = ctx.instance();
    let working = ctx.working();
    let max_len = ctx.max_segment_len();
    let routes = working.routes();

    for (from_vehicle, source) in routes.iter().enumerate() {
        let route = source.customers();
        let n = route.len();

        for len in 1..=max_len.min(n) {
            for start in 0..=n - len {
                let segment = &route[start..start + len];
                let first = segment[0];
                let last = segment[len - 1];
                let load: f64 = segment.iter().map(|&c| instance.node(c).demand()).sum();
                let inner: f64 = segment.windows(2).map(|w| arc(instance, w[0], w[1])).sum();

                let prev = node_before(route, start);
                let next = node_at(route, start + len);
                let removal = arc(instance, prev, next)
                    - arc(instance, prev, first)
                    - arc(instance, last, next)
                    - inner;
                let source_change =
                    ctx.cost_change(from_vehicle, source.distance() + removal, n - len);

                for (to_vehicle, target) in routes.iter().enumerate() {
                    if to_vehicle == from_vehicle {
                        continue;
                    }
                    let vehicle = instance.vehicle(to_vehicle);
                    if target.load() + load > vehicle.capacity() + FEASIBILITY_TOLERANCE
                        || vehicle
                            .max_customers()
                            .is_some_and(|max| target.len() + len > max)
                        || !segment
                            .iter()
                            .all(|&c| vehicle.accepts_demand(instance.node(c).demand()))
                    {
                        continue;
                    }

                    let target_route = target.customers();
                    for to in 0..=target_route.len() {
                        let a = node_before(target_route, to);
                        let b = node_at(target_route, to);
                        let insertion = arc(instance, a, first) + inner + arc(instance, last, b)
                            - arc(instance, a, b);
                        let estimate = source_change
                            + ctx.cost_change(
                                to_vehicle,
                                target.distance() + insertion,
                                target_route.len() + len,
                            );
                        ctx.consider(
                            Move::Relocate {
                                from_vehicle,
                                start,
                                len,
                                to_vehicle,
                                to,
                            },
                            estimate,
                        )?;
                    }
                }
            }
        }
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use crate::evaluation::RouteEvaluator;
    use crate::local_search::{
        GreedyAcceptor, LocalSearch, LocalSearchConfig, Move, Neighborhood, WorkingSolution,
    };
    use crate::models::{Instance, Node, Solution, Vehicle};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn only_relocate() -> LocalSearch {
        LocalSearch::new(
            LocalSearchConfig::default().with_neighborhoods(vec![Neighborhood::Relocate]),
        )
    }

    #[test]
    fn test_moves_customer_to_cheaper_vehicle() {
        let nodes = vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 1.0, 0.0, 1.0, 0.0),
            Node::customer(2, 2.0, 0.0, 1.0, 0.0),
        ];
        let vehicles = vec![
            Vehicle::new(0, 10.0).with_fixed_cost(50.0),
            Vehicle::new(1, 10.0).with_fixed_cost(5.0),
        ];
        let inst = Instance::from_coordinates(nodes, vehicles).expect("valid");
        let mut sol = Solution::new();
        sol.add_route(RouteEvaluator::new(&inst, 0).build_route(&[1, 2]).expect("feasible"));
        let mut working = WorkingSolution::from_solution(&inst, &sol).expect("verified");

        let mut rng = SmallRng::seed_from_u64(0);
        only_relocate().improve(&inst, &mut working, &mut GreedyAcceptor, &mut rng, 100);

        assert!(working.route(0).is_empty());
        assert_eq!(working.route(1).len(), 2);
        assert!((working.objective() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_respects_target_capacity() {
        let nodes = vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 1.0, 0.0, 6.0, 0.0),
            Node::customer(2, 1.0, 0.1, 6.0, 0.0),
        ];
        let vehicles = Vehicle::new(0, 10.0).with_fixed_cost(100.0).replicate(2);
        let inst = Instance::from_coordinates(nodes, vehicles).expect("valid");
        let mut sol = Solution::new();
        sol.add_route(RouteEvaluator::new(&inst, 0).build_route(&[1]).expect("feasible"));
        sol.add_route(RouteEvaluator::new(&inst, 1).build_route(&[2]).expect("feasible"));
        let mut working = WorkingSolution::from_solution(&inst, &sol).expect("verified");

        let mut rng = SmallRng::seed_from_u64(0);
        let applied = only_relocate().scan(&inst, &mut working, &mut GreedyAcceptor, &mut rng);
        assert!(applied.is_none());
        assert_eq!(working.num_used(), 2);
    }

    #[test]
    fn test_segment_relocation() {
        let nodes = vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 10.0, 0.0, 1.0, 0.0),
            Node::customer(2, 11.0, 0.0, 1.0, 0.0),
            Node::customer(3, 0.0, 10.0, 1.0, 0.0),
            Node::customer(4, 10.0, 1.0, 1.0, 0.0),
        ];
        let vehicles = Vehicle::new(0, 10.0).with_fixed_cost(1.0).replicate(2);
        let inst = Instance::from_coordinates(nodes, vehicles).expect("valid");
        let mut sol = Solution::new();
        sol.add_route(RouteEvaluator::new(&inst, 0).build_route(&[3, 1, 2]).expect("feasible"));
        sol.add_route(RouteEvaluator::new(&inst, 1).build_route(&[4]).expect("feasible"));
        let mut working = WorkingSolution::from_solution(&inst, &sol).expect("verified");
        let before = working.objective();

        let mut rng = SmallRng::seed_from_u64(0);
        let applied = only_relocate()
            .scan(&inst, &mut working, &mut GreedyAcceptor, &mut rng)
            .expect("improving relocation");
        assert!(matches!(applied.operation, Move::Relocate { .. }));
        assert!(working.objective() < before);
    }
}
