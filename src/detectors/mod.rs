//! Pure trigger / constraint / validation predicates, one module per
//! event type. None of these functions touch the pending buffer or the
//! state machine; the engine module composes them.

pub mod canopy;
pub mod freefall;
pub mod landing;
pub mod takeoff;

use crate::window::{mean, stddev, SlidingWindow};

/// Shared "is this window stable" predicate, used by landing's trigger
/// and validation.
pub fn is_stable(
    stability: &SlidingWindow<f64>,
    stability_window_size: usize,
    stability_threshold: f64,
    mean_vertical_speed_max: f64,
) -> bool {
    stability.len() >= stability_window_size
        && stddev(stability) < stability_threshold
        && mean(stability).abs() < mean_vertical_speed_max
}
