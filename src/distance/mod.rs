//! Distance matrix supplied to the instance.
//!
//! Provides a dense distance matrix; travel times are derived per vehicle
//! speed by [`Instance::travel_time`](crate::models::Instance::travel_time).

mod matrix;

pub use matrix::DistanceMatrix;
