//! Intra-route Or-opt.
//!
//! # Algorithm
//!
//! Moves a segment of 1 to `max_segment_len` consecutive customers to a
//! different position within the same route, keeping its orientation. For
//! each segment the removal gain is computed once and combined with the
//! insertion cost at every position of the remaining sequence.
//!
//! # Complexity
//!
//! O(k · n²) per route, where k = maximum segment length.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use std::ops::ControlFlow;

use super::engine::ScanContext;
use super::{arc, node_at, node_before, Move};

pub(super) fn scan(ctx: &mut ScanContext<'_>) -> ControlFlow<()> {
    let instance = ctx.instance();
    let working = ctx.working();
    let max_len = ctx.max_segment_len();
    let mut remaining: Vec<usize> = Vec::new();

    for (vehicle, state) in working.routes().iter().enumerate() {
        let route = state.customers();
        let n = route.len();
        if n < 2 {
            continue;
        }

        for len in 1..=max_len.min(n - 1) {
            for start in 0..=n - len {
                let first = route[start];
                let last = route[start + len - 1];
                let prev = node_before(route, start);
                let next = node_at(route, start + len);
                let removal =
                    arc(instance, prev, next) - arc(instance, prev, first) - arc(instance, last, next);

                remaining.clear();
                remaining.extend_from_slice(&route[..start]);
                remaining.extend_from_slice(&route[start + len..]);

                for to in 0..=remaining.len() {
                    if to == start {
                        continue;
                    }
                    let a = node_before(&remaining, to);
                    let b = node_at(&remaining, to);
                    let insertion =
                        arc(instance, a, first) + arc(instance, last, b) - arc(instance, a, b);
                    let estimate =
                        ctx.cost_change(vehicle, state.distance() + removal + insertion, n);
                    ctx.consider(
                        Move::OrOpt {
                            vehicle,
                            start,
                            len,
                            to,
                        },
                        estimate,
                    )?;
                }
            }
        }
    }
    ControlFlow::Continue(())
}
