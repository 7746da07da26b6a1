//! Inter-route tail exchange (2-opt*).
//!
//! # Algorithm
//!
//! Given routes R1 = [a₁, ..., aᵢ, aᵢ₊₁, ..., aₙ] and
//! R2 = [b₁, ..., bⱼ, bⱼ₊₁, ..., bₘ], produce:
//!
//! R1' = [a₁, ..., aᵢ, bⱼ₊₁, ..., bₘ]
//! R2' = [b₁, ..., bⱼ, aᵢ₊₁, ..., aₙ]
//!
//! One of the two routes may be an unused vehicle, in which case the move
//! splits a route across two vehicles or hands a whole route over.
//! Prefix and suffix distances and loads are tabulated once per scan, so
//! each candidate is priced in O(1).
//!
//! # Complexity
//!
//! O(n² · V²) per scan, where n = customers per route, V = vehicles.
//!
//! # Reference
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An Exchange Heuristic for
//! Routeing Problems with Time Windows", *Journal of the Operational Research
//! Society* 46(12), 1433-1446.

use std::ops::ControlFlow;

use super::engine::ScanContext;
use super::{arc, node_at, node_before, Move};
use crate::evaluation::FEASIBILITY_TOLERANCE;
use crate::models::Instance;

/// Cumulative figures of one route, indexed by cut position.
struct Profile {
    /// `prefix_distance[k]`: depot through `r[..k]`.
    prefix_distance: Vec<f64>,
    /// `suffix_distance[k]`: `r[k..]` back to the depot.
    suffix_distance: Vec<f64>,
    /// `prefix_load[k]`: demand of `r[..k]`.
    prefix_load: Vec<f64>,
}

impl Profile {
    fn new(instance: &Instance, route: &[usize]) -> Self {
        let n = route.len();
        let mut prefix_distance = vec![0.0; n + 1];
        let mut prefix_load = vec![0.0; n + 1];
        let mut suffix_distance = vec![0.0; n + 1];
        for k in 1..=n {
            prefix_distance[k] =
                prefix_distance[k - 1] + arc(instance, node_before(route, k - 1), route[k - 1]);
            prefix_load[k] = prefix_load[k - 1] + instance.node(route[k - 1]).demand();
        }
        for k in (0..n).rev() {
            suffix_distance[k] = suffix_distance[k + 1] + arc(instance, route[k], node_at(route, k + 1));
        }
        Self {
            prefix_distance,
            suffix_distance,
            prefix_load,
        }
    }

    fn total_load(&self) -> f64 {
        self.prefix_load.last().copied().unwrap_or(0.0)
    }
}

pub(super) fn scan(ctx: &mut ScanContext<'_>) -> ControlFlow<()> {
    let instance = ctx.instance();
    let routes = ctx.working().routes();
    let profiles: Vec<Profile> = routes
        .iter()
        .map(|r| Profile::new(instance, r.customers()))
        .collect();

    for (first_vehicle, first) in routes.iter().enumerate() {
        let a = first.customers();
        let pa = &profiles[first_vehicle];
        let cap_a = instance.vehicle(first_vehicle).capacity();

        for (second_vehicle, second) in routes.iter().enumerate().skip(first_vehicle + 1) {
            let b = second.customers();
            if a.is_empty() && b.is_empty() {
                continue;
            }
            let pb = &profiles[second_vehicle];
            let cap_b = instance.vehicle(second_vehicle).capacity();

            for cut_a in 0..=a.len() {
                for cut_b in 0..=b.len() {
                    if cut_a == a.len() && cut_b == b.len() {
                        continue;
                    }
                    let load_a = pa.prefix_load[cut_a] + pb.total_load() - pb.prefix_load[cut_b];
                    let load_b = pb.prefix_load[cut_b] + pa.total_load() - pa.prefix_load[cut_a];
                    if load_a > cap_a + FEASIBILITY_TOLERANCE
                        || load_b > cap_b + FEASIBILITY_TOLERANCE
                    {
                        continue;
                    }

                    let len_a = cut_a + b.len() - cut_b;
                    let len_b = cut_b + a.len() - cut_a;
                    let distance_a = pa.prefix_distance[cut_a]
                        + arc(instance, node_before(a, cut_a), node_at(b, cut_b))
                        + pb.suffix_distance[cut_b];
                    let distance_b = pb.prefix_distance[cut_b]
                        + arc(instance, node_before(b, cut_b), node_at(a, cut_a))
                        + pa.suffix_distance[cut_a];
                    let estimate = ctx.cost_change(first_vehicle, distance_a, len_a)
                        + ctx.cost_change(second_vehicle, distance_b, len_b);

                    ctx.consider(
                        Move::TwoOptStar {
                            first_vehicle,
                            first_cut: cut_a,
                            second_vehicle,
                            second_cut: cut_b,
                        },
                        estimate,
                    )?;
                }
            }
        }
    }
    ControlFlow::Continue(())
}
