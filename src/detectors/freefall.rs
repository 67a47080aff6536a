//! Freefall: a sustained high vertical speed, or a sharp acceleration off
//! a moderate velocity floor (catches short freefalls before the
//! threshold trigger has time to fire).

use crate::config::FreefallConfig;
use crate::event_state::EventState;
use crate::events::{DetectedEvents, EventType};
use crate::sample::Kinematics;
use crate::window::{acceleration, median};

/// `previous_median` is `median(smoothing)` computed *before* the current
/// sample was pushed into the window, i.e. from the prior step.
pub fn trigger(
    state: &EventState,
    previous_median: f64,
    kinematics: &Kinematics,
    config: &FreefallConfig,
) -> bool {
    let current_median = median(&state.smoothing);
    let over_threshold = current_median > config.vertical_speed_threshold;
    let accelerating_off_floor = acceleration(current_median, previous_median, kinematics.delta_time)
        > config.acceleration_threshold
        && current_median > config.acceleration_min_velocity;
    over_threshold || accelerating_off_floor
}

pub fn constraints(
    detected: &DetectedEvents,
    kinematics: &Kinematics,
    index: u64,
    config: &FreefallConfig,
) -> bool {
    if !detected.is_eligible(EventType::Freefall) {
        return false;
    }
    if let Some(takeoff) = detected.takeoff {
        if index <= takeoff.index {
            return false;
        }
        if kinematics.corrected_altitude > takeoff.altitude + config.min_altitude_above {
            return true;
        }
    }
    kinematics.corrected_altitude > config.min_altitude_absolute
}

pub fn validate(state: &EventState, config: &FreefallConfig) -> bool {
    median(&state.smoothing) > 0.8 * config.vertical_speed_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::FlightEvent;
    use crate::sample::VerticalSpeedSample;

    fn kin(altitude: f64, dt: f64) -> Kinematics {
        Kinematics {
            raw_vertical_speed: 0.0,
            raw_north_speed: 0.0,
            raw_east_speed: 0.0,
            clipped_vertical_speed: 0.0,
            clipped_north_speed: 0.0,
            clipped_east_speed: 0.0,
            corrected_altitude: altitude,
            horizontal_speed: 0.0,
            total_speed: 0.0,
            delta_time: dt,
        }
    }

    fn state_with_smoothing(values: &[f64]) -> EventState {
        let mut state = EventState::new(values.len().max(1), 10, 0);
        for v in values {
            state.smoothing.push(*v);
            state.backtrack.push(VerticalSpeedSample {
                index: 0,
                clipped_vertical_speed: *v,
                corrected_altitude: 3000.0,
            });
        }
        state
    }

    #[test]
    fn triggers_on_sustained_high_vertical_speed() {
        let config = FreefallConfig::default();
        let state = state_with_smoothing(&[50.0, 50.0, 50.0]);
        assert!(trigger(&state, 50.0, &kin(3000.0, 0.2), &config));
    }

    #[test]
    fn triggers_on_sharp_acceleration_off_velocity_floor() {
        let config = FreefallConfig::default();
        let state = state_with_smoothing(&[11.0, 12.0, 15.0]);
        // previous_median well below current, large acceleration
        assert!(trigger(&state, 11.0, &kin(3000.0, 0.2), &config));
    }

    #[test]
    fn does_not_trigger_on_low_speed_low_acceleration() {
        let config = FreefallConfig::default();
        let state = state_with_smoothing(&[2.0, 2.0, 2.0]);
        assert!(!trigger(&state, 2.0, &kin(3000.0, 0.2), &config));
    }

    #[test]
    fn constraints_require_altitude_above_takeoff_by_minimum() {
        let config = FreefallConfig::default();
        let mut detected = DetectedEvents::default();
        detected.takeoff = Some(FlightEvent { index: 10, altitude: 100.0 });
        assert!(!constraints(&detected, &kin(500.0, 0.2), 20, &config));
        assert!(constraints(&detected, &kin(800.0, 0.2), 20, &config));
    }

    #[test]
    fn constraints_allow_absolute_altitude_fallback_without_takeoff() {
        let config = FreefallConfig::default();
        let detected = DetectedEvents::default();
        assert!(constraints(&detected, &kin(700.0, 0.2), 20, &config));
        assert!(!constraints(&detected, &kin(100.0, 0.2), 20, &config));
    }

    #[test]
    fn constraints_reject_index_before_or_at_takeoff() {
        let config = FreefallConfig::default();
        let mut detected = DetectedEvents::default();
        detected.takeoff = Some(FlightEvent { index: 20, altitude: 100.0 });
        assert!(!constraints(&detected, &kin(3000.0, 0.2), 20, &config));
    }
}
