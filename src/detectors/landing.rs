//! Landing: ground speed drops below threshold and stays there through a
//! stable window.

use super::is_stable;
use crate::config::LandingConfig;
use crate::event_state::EventState;
use crate::events::{DetectedEvents, EventType};
use crate::sample::Kinematics;

pub fn trigger(state: &EventState, kinematics: &Kinematics, config: &LandingConfig) -> bool {
    kinematics.total_speed < config.speed_max
        && is_stable(
            &state.stability,
            config.stability_window_size,
            config.stability_threshold,
            config.mean_vertical_speed_max,
        )
}

pub fn constraints(
    detected: &DetectedEvents,
    kinematics: &Kinematics,
    index: u64,
    config: &LandingConfig,
) -> bool {
    let _ = config;
    if !detected.is_eligible(EventType::Landing) {
        return false;
    }
    if let Some(canopy) = detected.canopy {
        if index <= canopy.index || kinematics.corrected_altitude >= canopy.altitude {
            return false;
        }
    }
    true
}

pub fn validate(state: &EventState, kinematics: &Kinematics, config: &LandingConfig) -> bool {
    kinematics.total_speed < 2.0 * config.speed_max
        && is_stable(
            &state.stability,
            config.stability_window_size,
            config.stability_threshold,
            config.mean_vertical_speed_max,
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::FlightEvent;
    use crate::sample::VerticalSpeedSample;

    fn kin(total_speed: f64, altitude: f64) -> Kinematics {
        Kinematics {
            raw_vertical_speed: 0.0,
            raw_north_speed: 0.0,
            raw_east_speed: 0.0,
            clipped_vertical_speed: 0.0,
            clipped_north_speed: 0.0,
            clipped_east_speed: 0.0,
            corrected_altitude: altitude,
            horizontal_speed: 0.0,
            total_speed,
            delta_time: 0.2,
        }
    }

    fn stable_state(len: usize) -> EventState {
        let mut state = EventState::new(5, 10, len);
        for _ in 0..len {
            state.stability.push(0.2);
            state.backtrack.push(VerticalSpeedSample {
                index: 0,
                clipped_vertical_speed: 0.2,
                corrected_altitude: 115.0,
            });
        }
        state
    }

    #[test]
    fn triggers_on_low_speed_and_stable_window() {
        let config = LandingConfig::default();
        let state = stable_state(config.stability_window_size);
        assert!(trigger(&state, &kin(0.3, 115.0), &config));
    }

    #[test]
    fn does_not_trigger_before_window_is_full() {
        let config = LandingConfig::default();
        let state = stable_state(config.stability_window_size - 1);
        assert!(!trigger(&state, &kin(0.3, 115.0), &config));
    }

    #[test]
    fn does_not_trigger_above_speed_ceiling() {
        let config = LandingConfig::default();
        let state = stable_state(config.stability_window_size);
        assert!(!trigger(&state, &kin(10.0, 115.0), &config));
    }

    #[test]
    fn constraints_require_canopy_or_takeoff_set() {
        let config = LandingConfig::default();
        let detected = DetectedEvents::default();
        assert!(!constraints(&detected, &kin(0.3, 115.0), 100, &config));
        let with_takeoff = DetectedEvents::default().with_set(
            EventType::Takeoff,
            FlightEvent { index: 1, altitude: 1.0 },
        );
        assert!(constraints(&with_takeoff, &kin(0.3, 115.0), 100, &config));
    }

    #[test]
    fn constraints_require_altitude_below_canopy_when_set() {
        let config = LandingConfig::default();
        let mut detected = DetectedEvents::default();
        detected.canopy = Some(FlightEvent { index: 50, altitude: 3000.0 });
        assert!(constraints(&detected, &kin(0.3, 115.0), 100, &config));
        assert!(!constraints(&detected, &kin(0.3, 3500.0), 100, &config));
    }
}
