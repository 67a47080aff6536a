//! Fully-enumerated engine configuration.
//!
//! The core never reads the environment or filesystem; it receives a
//! complete `Config` value. The CLI adapter is responsible for loading a
//! TOML overlay and applying `--set group.option=value` overrides on top
//! of [`Config::default`] before handing the result to the engine.

use serde::{Deserialize, Serialize};

use crate::events::EventType;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub acceleration_clip: f64,
    pub inflection_min_speed_delta: f64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            acceleration_clip: 20.0,
            inflection_min_speed_delta: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TakeoffConfig {
    pub speed_threshold: f64,
    pub climb_rate: f64,
    pub max_altitude: f64,
    pub smoothing_window_size: usize,
    pub backtrack_window_size: usize,
    pub validation_window_size: u32,
}

impl Default for TakeoffConfig {
    fn default() -> Self {
        Self {
            speed_threshold: 25.0,
            climb_rate: -1.0,
            max_altitude: 600.0,
            smoothing_window_size: 5,
            backtrack_window_size: 10,
            validation_window_size: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreefallConfig {
    pub vertical_speed_threshold: f64,
    pub acceleration_threshold: f64,
    pub acceleration_min_velocity: f64,
    pub min_altitude_above: f64,
    pub min_altitude_absolute: f64,
    pub smoothing_window_size: usize,
    pub backtrack_window_size: usize,
    pub validation_window_size: u32,
}

impl Default for FreefallConfig {
    fn default() -> Self {
        Self {
            vertical_speed_threshold: 25.0,
            acceleration_threshold: 3.0,
            acceleration_min_velocity: 10.0,
            min_altitude_above: 600.0,
            min_altitude_absolute: 600.0,
            smoothing_window_size: 5,
            backtrack_window_size: 10,
            validation_window_size: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyConfig {
    pub vertical_speed_max: f64,
    pub smoothing_window_size: usize,
    pub backtrack_window_size: usize,
    pub validation_window_size: u32,
}

impl Default for CanopyConfig {
    fn default() -> Self {
        Self {
            vertical_speed_max: 12.0,
            smoothing_window_size: 5,
            backtrack_window_size: 10,
            validation_window_size: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingConfig {
    pub speed_max: f64,
    pub stability_threshold: f64,
    pub mean_vertical_speed_max: f64,
    /// Reserved: not yet enforced by any detector predicate. Threaded
    /// through configuration so a future landing/takeoff proximity check
    /// can consume it without a breaking config change.
    pub altitude_tolerance: f64,
    pub stability_window_size: usize,
    pub smoothing_window_size: usize,
    pub backtrack_window_size: usize,
    pub validation_window_size: u32,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            speed_max: 5.0,
            stability_threshold: 0.5,
            mean_vertical_speed_max: 1.0,
            altitude_tolerance: 500.0,
            stability_window_size: 10,
            smoothing_window_size: 5,
            backtrack_window_size: 10,
            validation_window_size: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub global: GlobalConfig,
    pub takeoff: TakeoffConfig,
    pub freefall: FreefallConfig,
    pub canopy: CanopyConfig,
    pub landing: LandingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            takeoff: TakeoffConfig::default(),
            freefall: FreefallConfig::default(),
            canopy: CanopyConfig::default(),
            landing: LandingConfig::default(),
        }
    }
}

impl Config {
    /// The largest backtrack window across all event types. Used by the
    /// engine to bound the pending buffer in `Streaming`.
    pub fn max_backtrack_window_size(&self) -> usize {
        [
            self.takeoff.backtrack_window_size,
            self.freefall.backtrack_window_size,
            self.canopy.backtrack_window_size,
            self.landing.backtrack_window_size,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// The largest validation window across all event types. Together
    /// with `max_backtrack_window_size` this bounds peak buffer size.
    pub fn max_validation_window_size(&self) -> u32 {
        [
            self.takeoff.validation_window_size,
            self.freefall.validation_window_size,
            self.canopy.validation_window_size,
            self.landing.validation_window_size,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn validation_window_size(&self, event_type: EventType) -> u32 {
        match event_type {
            EventType::Takeoff => self.takeoff.validation_window_size,
            EventType::Freefall => self.freefall.validation_window_size,
            EventType::Canopy => self.canopy.validation_window_size,
            EventType::Landing => self.landing.validation_window_size,
        }
    }

    pub fn backtrack_window_size(&self, event_type: EventType) -> usize {
        match event_type {
            EventType::Takeoff => self.takeoff.backtrack_window_size,
            EventType::Freefall => self.freefall.backtrack_window_size,
            EventType::Canopy => self.canopy.backtrack_window_size,
            EventType::Landing => self.landing.backtrack_window_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_table() {
        let cfg = Config::default();
        assert_eq!(cfg.global.acceleration_clip, 20.0);
        assert_eq!(cfg.takeoff.speed_threshold, 25.0);
        assert_eq!(cfg.takeoff.climb_rate, -1.0);
        assert_eq!(cfg.freefall.vertical_speed_threshold, 25.0);
        assert_eq!(cfg.canopy.vertical_speed_max, 12.0);
        assert_eq!(cfg.landing.speed_max, 5.0);
        assert_eq!(cfg.landing.stability_window_size, 10);
    }

    #[test]
    fn toml_overlay_deserializes_partial_group() {
        let overlay = r#"
            [takeoff]
            speed_threshold = 30.0
        "#;
        let cfg: Config = toml::from_str(overlay).unwrap();
        assert_eq!(cfg.takeoff.speed_threshold, 30.0);
        // Untouched fields still carry documented defaults.
        assert_eq!(cfg.takeoff.climb_rate, -1.0);
        assert_eq!(cfg.landing.speed_max, 5.0);
    }

    #[test]
    fn max_window_helpers_pick_largest_across_event_types() {
        let mut cfg = Config::default();
        cfg.canopy.backtrack_window_size = 99;
        cfg.freefall.validation_window_size = 77;
        assert_eq!(cfg.max_backtrack_window_size(), 99);
        assert_eq!(cfg.max_validation_window_size(), 77);
    }
}
