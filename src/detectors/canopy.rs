//! Canopy: a moderate, controlled descent rate after freefall.

use crate::config::CanopyConfig;
use crate::event_state::EventState;
use crate::events::{DetectedEvents, EventType};
use crate::sample::Kinematics;
use crate::window::median;

pub fn trigger(state: &EventState, config: &CanopyConfig) -> bool {
    let m = median(&state.smoothing);
    m > 0.0 && m < config.vertical_speed_max
}

pub fn constraints(
    detected: &DetectedEvents,
    kinematics: &Kinematics,
    index: u64,
    config: &CanopyConfig,
) -> bool {
    let _ = config;
    if !detected.is_eligible(EventType::Canopy) {
        return false;
    }
    let Some(freefall) = detected.freefall else {
        return false;
    };
    if index <= freefall.index || kinematics.corrected_altitude >= freefall.altitude {
        return false;
    }
    if let Some(takeoff) = detected.takeoff {
        if kinematics.corrected_altitude <= takeoff.altitude {
            return false;
        }
    }
    true
}

pub fn validate(state: &EventState, config: &CanopyConfig) -> bool {
    let m = median(&state.smoothing);
    m > 0.0 && m < 1.5 * config.vertical_speed_max
}
