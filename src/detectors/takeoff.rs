//! Takeoff: a ground-speed run-up followed by a sustained negative
//! (climbing) vertical rate.

use crate::config::TakeoffConfig;
use crate::event_state::EventState;
use crate::events::DetectedEvents;
use crate::sample::Kinematics;
use crate::window::median;

pub fn trigger(state: &EventState, kinematics: &Kinematics, config: &TakeoffConfig) -> bool {
    kinematics.horizontal_speed > config.speed_threshold && median(&state.smoothing) < config.climb_rate
}

pub fn constraints(detected: &DetectedEvents, kinematics: &Kinematics, config: &TakeoffConfig) -> bool {
    detected.takeoff.is_none() && kinematics.corrected_altitude < config.max_altitude
}

pub fn validate(state: &EventState, config: &TakeoffConfig) -> bool {
    median(&state.smoothing) < config.climb_rate
}
