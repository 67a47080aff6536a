//! Per-event sliding-window state: one instance per `EventType`, each
//! holding the three FIFOs its detector predicates read from.

use crate::config::Config;
use crate::sample::{Kinematics, VerticalSpeedSample};
use crate::window::SlidingWindow;

/// Smoothing + backtrack + stability windows for a single event type.
#[derive(Debug, Clone)]
pub struct EventState {
    pub smoothing: SlidingWindow<f64>,
    pub backtrack: SlidingWindow<VerticalSpeedSample>,
    pub stability: SlidingWindow<f64>,
}

impl EventState {
    pub fn new(smoothing_capacity: usize, backtrack_capacity: usize, stability_capacity: usize) -> Self {
        Self {
            smoothing: SlidingWindow::new(smoothing_capacity),
            backtrack: SlidingWindow::new(backtrack_capacity),
            stability: SlidingWindow::new(stability_capacity),
        }
    }

    /// Push the current sample's derived quantities into all three
    /// windows. Called once per event type on every processed sample.
    pub fn push(&mut self, index: u64, kinematics: &Kinematics) {
        self.smoothing.push(kinematics.clipped_vertical_speed);
        self.stability.push(kinematics.clipped_vertical_speed);
        self.backtrack.push(VerticalSpeedSample {
            index,
            clipped_vertical_speed: kinematics.clipped_vertical_speed,
            corrected_altitude: kinematics.corrected_altitude,
        });
    }
}

/// The four per-event states bundled together, keyed by `EventType`.
#[derive(Debug, Clone)]
pub struct EventStates {
    pub takeoff: EventState,
    pub freefall: EventState,
    pub canopy: EventState,
    pub landing: EventState,
}

impl EventStates {
    pub fn new(config: &Config) -> Self {
        Self {
            takeoff: EventState::new(
                config.takeoff.smoothing_window_size,
                config.takeoff.backtrack_window_size,
                0,
            ),
            freefall: EventState::new(
                config.freefall.smoothing_window_size,
                config.freefall.backtrack_window_size,
                0,
            ),
            canopy: EventState::new(
                config.canopy.smoothing_window_size,
                config.canopy.backtrack_window_size,
                0,
            ),
            landing: EventState::new(
                config.landing.smoothing_window_size,
                config.landing.backtrack_window_size,
                config.landing.stability_window_size,
            ),
        }
    }

    pub fn push_all(&mut self, index: u64, kinematics: &Kinematics) {
        self.takeoff.push(index, kinematics);
        self.freefall.push(index, kinematics);
        self.canopy.push(index, kinematics);
        self.landing.push(index, kinematics);
    }

    pub fn get(&self, event_type: crate::events::EventType) -> &EventState {
        use crate::events::EventType;
        match event_type {
            EventType::Takeoff => &self.takeoff,
            EventType::Freefall => &self.freefall,
            EventType::Canopy => &self.canopy,
            EventType::Landing => &self.landing,
        }
    }
}
