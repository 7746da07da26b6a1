//! Inter-route customer exchange (swap).
//!
//! Swaps one customer of a route with one customer of another route. Both
//! routes keep their length, so only the four edges around the swapped
//! customers change.

use std::ops::ControlFlow;

use super::engine::ScanContext;
use super::{arc, node_at, node_before, Move};
use crate::evaluation::FEASIBILITY_TOLERANCE;

pub(super) fn scan(ctx: &mut ScanContext<'_>) -> ControlFlow<()> {
    let instance = ctx.instance();
    let routes = ctx.working().routes();

    for (first_vehicle, first) in routes.iter().enumerate() {
        if first.is_empty() {
            continue;
        }
        let a = first.customers();
        let va = instance.vehicle(first_vehicle);

        for (second_vehicle, second) in routes.iter().enumerate().skip(first_vehicle + 1) {
            if second.is_empty() {
                continue;
            }
            let b = second.customers();
            let vb = instance.vehicle(second_vehicle);

            for (i, &ca) in a.iter().enumerate() {
                let da = instance.node(ca).demand();
                let (pa, na) = (node_before(a, i), node_at(a, i + 1));

                for (j, &cb) in b.iter().enumerate() {
                    let db = instance.node(cb).demand();
                    if first.load() - da + db > va.capacity() + FEASIBILITY_TOLERANCE
                        || second.load() - db + da > vb.capacity() + FEASIBILITY_TOLERANCE
                        || !va.accepts_demand(db)
                        || !vb.accepts_demand(da)
                    {
                        continue;
                    }
                    let (pb, nb) = (node_before(b, j), node_at(b, j + 1));

                    let delta_a = arc(instance, pa, cb) + arc(instance, cb, na)
                        - arc(instance, pa, ca)
                        - arc(instance, ca, na);
                    let delta_b = arc(instance, pb, ca) + arc(instance, ca, nb)
                        - arc(instance, pb, cb)
                        - arc(instance, cb, nb);
                    let estimate = ctx.cost_change(first_vehicle, first.distance() + delta_a, a.len())
                        + ctx.cost_change(second_vehicle, second.distance() + delta_b, b.len());

                    ctx.consider(
                        Move::Exchange {
                            first_vehicle,
                            first_pos: i,
                            second_vehicle,
                            second_pos: j,
                        },
                        estimate,
                    )?;
                }
            }
        }
    }
    ControlFlow::Continue(())
}
