//! Physical-acceleration clipping, altitude correction, and structural
//! input validation. The only place in the core that can fail.

use crate::config::Config;
use crate::error::{EngineError, InvalidInputReason};
use crate::sample::{InputSample, Kinematics, Timestamp};

const NOMINAL_FIRST_SAMPLE_DT: f64 = 0.2;

fn is_malformed(value: f64) -> bool {
    !value.is_finite()
}

/// Clip a single velocity component against the previous clipped value,
/// given the physical acceleration ceiling.
fn clip_component(current: f64, previous_clipped: f64, acceleration_clip: f64, dt: f64) -> f64 {
    let max_delta = acceleration_clip * dt;
    let delta = current - previous_clipped;
    if delta.abs() > max_delta {
        previous_clipped + delta.signum() * max_delta
    } else {
        current
    }
}

/// Given the current sample, the previous sample (if any) and the
/// previous `Kinematics` (if any), produce the next `Kinematics`.
///
/// Returns `EngineError::InvalidInput` for NaN/∞ fields or a
/// non-monotonic timestamp (excluding the synthetic first-sample case).
pub fn process<T: Timestamp, S>(
    index: u64,
    current: &InputSample<T, S>,
    previous: Option<&InputSample<T, S>>,
    previous_kinematics: Option<&Kinematics>,
    config: &Config,
) -> Result<Kinematics, EngineError> {
    if is_malformed(current.altitude)
        || is_malformed(current.north_speed)
        || is_malformed(current.east_speed)
        || is_malformed(current.vertical_speed)
    {
        return Err(EngineError::InvalidInput {
            index,
            reason: InvalidInputReason::NonFiniteField,
        });
    }

    let dt = match previous {
        Some(prev) => {
            let dt = current.time.seconds_since(&prev.time);
            if dt < 0.0 {
                return Err(EngineError::InvalidInput {
                    index,
                    reason: InvalidInputReason::NonMonotonicTimestamp,
                });
            }
            dt
        }
        None => NOMINAL_FIRST_SAMPLE_DT,
    };

    let acceleration_clip = config.global.acceleration_clip;
    let (prev_clipped_v, prev_clipped_n, prev_clipped_e, prev_altitude) = match previous_kinematics
    {
        Some(k) => (
            k.clipped_vertical_speed,
            k.clipped_north_speed,
            k.clipped_east_speed,
            k.corrected_altitude,
        ),
        None => (
            current.vertical_speed,
            current.north_speed,
            current.east_speed,
            current.altitude,
        ),
    };

    let clipped_vertical_speed =
        clip_component(current.vertical_speed, prev_clipped_v, acceleration_clip, dt);
    let clipped_north_speed =
        clip_component(current.north_speed, prev_clipped_n, acceleration_clip, dt);
    let clipped_east_speed =
        clip_component(current.east_speed, prev_clipped_e, acceleration_clip, dt);

    let vertical_was_clipped = (clipped_vertical_speed - current.vertical_speed).abs() > f64::EPSILON;
    let corrected_altitude = if vertical_was_clipped {
        prev_altitude - clipped_vertical_speed * dt
    } else {
        current.altitude
    };

    let horizontal_speed = (clipped_north_speed.powi(2) + clipped_east_speed.powi(2)).sqrt();
    let total_speed = (clipped_north_speed.powi(2)
        + clipped_east_speed.powi(2)
        + clipped_vertical_speed.powi(2))
    .sqrt();

    Ok(Kinematics {
        raw_vertical_speed: current.vertical_speed,
        raw_north_speed: current.north_speed,
        raw_east_speed: current.east_speed,
        clipped_vertical_speed,
        clipped_north_speed,
        clipped_east_speed,
        corrected_altitude,
        horizontal_speed,
        total_speed,
        delta_time: dt,
    })
}
