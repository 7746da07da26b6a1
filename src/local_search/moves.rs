//! Neighborhood identifiers and concrete moves.

use serde::{Deserialize, Serialize};

use super::WorkingSolution;

/// A family of moves explored by the local search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Neighborhood {
    /// Reverse a contiguous segment within one route.
    TwoOpt,
    /// Move a short segment to another position of the same route.
    OrOpt,
    /// Move a short segment to another vehicle, possibly an unused one.
    Relocate,
    /// Swap two customers between two routes.
    Exchange,
    /// Exchange the tails of two routes.
    TwoOptStar,
}

impl Neighborhood {
    /// Every neighborhood, in default scan order.
    pub const ALL: [Neighborhood; 5] = [
        Neighborhood::TwoOpt,
        Neighborhood::OrOpt,
        Neighborhood::Relocate,
        Neighborhood::Exchange,
        Neighborhood::TwoOptStar,
    ];
}

/// A concrete move. Positions index into the vehicles' customer sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    /// Reverse `customers[from..=to]` of `vehicle`.
    TwoOpt { vehicle: usize, from: usize, to: usize },
    /// Cut `customers[start..start + len]` and reinsert it at index `to` of
    /// the remaining sequence.
    OrOpt {
        vehicle: usize,
        start: usize,
        len: usize,
        to: usize,
    },
    /// Cut `customers[start..start + len]` of `from_vehicle` and insert it at
    /// index `to` of `to_vehicle`.
    Relocate {
        from_vehicle: usize,
        start: usize,
        len: usize,
        to_vehicle: usize,
        to: usize,
    },
    /// Swap the customer at `first_pos` of `first_vehicle` with the customer
    /// at `second_pos` of `second_vehicle`.
    Exchange {
        first_vehicle: usize,
        first_pos: usize,
        second_vehicle: usize,
        second_pos: usize,
    },
    /// Replace `first[first_cut..]` with `second[second_cut..]` and vice versa.
    TwoOptStar {
        first_vehicle: usize,
        first_cut: usize,
        second_vehicle: usize,
        second_cut: usize,
    },
}

impl Move {
    pub fn neighborhood(&self) -> Neighborhood {
        match self {
            Move::TwoOpt { .. } => Neighborhood::TwoOpt,
            Move::OrOpt { .. } => Neighborhood::OrOpt,
            Move::Relocate { .. } => Neighborhood::Relocate,
            Move::Exchange { .. } => Neighborhood::Exchange,
            Move::TwoOptStar { .. } => Neighborhood::TwoOptStar,
        }
    }

    /// Vehicles whose routes this move changes.
    pub fn vehicles(&self) -> Vec<usize> {
        match *self {
            Move::TwoOpt { vehicle, .. } | Move::OrOpt { vehicle, .. } => vec![vehicle],
            Move::Relocate {
                from_vehicle,
                to_vehicle,
                ..
            } => vec![from_vehicle, to_vehicle],
            Move::Exchange {
                first_vehicle,
                second_vehicle,
                ..
            }
            | Move::TwoOptStar {
                first_vehicle,
                second_vehicle,
                ..
            } => vec![first_vehicle, second_vehicle],
        }
    }

    /// Customer sequences of the touched vehicles after the move.
    pub fn resulting_routes(&self, working: &WorkingSolution) -> Vec<(usize, Vec<usize>)> {
        match *self {
            Move::TwoOpt { vehicle, from, to } => {
                let mut seq = working.route(vehicle).customers().to_vec();
                seq[from..=to].reverse();
                vec![(vehicle, seq)]
            }
            Move::OrOpt {
                vehicle,
                start,
                len,
                to,
            } => {
                let mut seq = working.route(vehicle).customers().to_vec();
                let segment: Vec<usize> = seq.drain(start..start + len).collect();
                seq.splice(to..to, segment);
                vec![(vehicle, seq)]
            }
            Move::Relocate {
                from_vehicle,
                start,
                len,
                to_vehicle,
                to,
            } => {
                let mut source = working.route(from_vehicle).customers().to_vec();
                let mut target = working.route(to_vehicle).customers().to_vec();
                let segment: Vec<usize> = source.drain(start..start + len).collect();
                target.splice(to..to, segment);
                vec![(from_vehicle, source), (to_vehicle, target)]
            }
            Move::Exchange {
                first_vehicle,
                first_pos,
                second_vehicle,
                second_pos,
            } => {
                let mut first = working.route(first_vehicle).customers().to_vec();
                let mut second = working.route(second_vehicle).customers().to_vec();
                std::mem::swap(&mut first[first_pos], &mut second[second_pos]);
                vec![(first_vehicle, first), (second_vehicle, second)]
            }
            Move::TwoOptStar {
                first_vehicle,
                first_cut,
                second_vehicle,
                second_cut,
            } => {
                let a = working.route(first_vehicle).customers();
                let b = working.route(second_vehicle).customers();
                let first: Vec<usize> = a[..first_cut].iter().chain(&b[second_cut..]).copied().collect();
                let second: Vec<usize> = b[..second_cut].iter().chain(&a[first_cut..]).copied().collect();
                vec![(first_vehicle, first), (second_vehicle, second)]
            }
        }
    }
}
