//! Input sample type, the opaque-payload projection trait, and the
//! kinematics derived from consecutive samples.

use chrono::{DateTime, Utc};

/// A timestamp the engine can difference into a `Δt` in seconds. Adapters
/// pick whichever concrete type suits their source format; the core never
/// cares which one it is.
pub trait Timestamp: Copy {
    /// Seconds elapsed from `other` to `self`. Negative if `self` precedes
    /// `other`.
    fn seconds_since(&self, other: &Self) -> f64;
}

impl Timestamp for f64 {
    fn seconds_since(&self, other: &Self) -> f64 {
        self - other
    }
}

impl Timestamp for DateTime<Utc> {
    fn seconds_since(&self, other: &Self) -> f64 {
        self.signed_duration_since(*other).num_milliseconds() as f64 / 1000.0
    }
}

/// The raw numeric fields every adapter must be able to project out of its
/// own row type, regardless of source format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFields<T: Timestamp> {
    pub time: T,
    pub altitude: f64,
    pub north_speed: f64,
    pub east_speed: f64,
    pub vertical_speed: f64,
}

/// Implemented by whatever concrete row type an adapter owns (e.g. a
/// `csv`-deserialized struct) so the core can pull out the fields it needs
/// without knowing anything else about the row.
pub trait HasInputFields<T: Timestamp> {
    fn input_fields(&self) -> RawFields<T>;
}

/// One sample of the input stream, generic over an opaque `source` payload
/// the core carries through unchanged and never inspects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample<T: Timestamp, S> {
    pub time: T,
    pub altitude: f64,
    pub north_speed: f64,
    pub east_speed: f64,
    pub vertical_speed: f64,
    pub source: S,
}

impl<T: Timestamp, S> InputSample<T, S> {
    pub fn from_fields(fields: RawFields<T>, source: S) -> Self {
        Self {
            time: fields.time,
            altitude: fields.altitude,
            north_speed: fields.north_speed,
            east_speed: fields.east_speed,
            vertical_speed: fields.vertical_speed,
            source,
        }
    }
}

/// Derived per-sample quantities. One produced per processed input sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub raw_vertical_speed: f64,
    pub raw_north_speed: f64,
    pub raw_east_speed: f64,
    pub clipped_vertical_speed: f64,
    pub clipped_north_speed: f64,
    pub clipped_east_speed: f64,
    pub corrected_altitude: f64,
    pub horizontal_speed: f64,
    pub total_speed: f64,
    pub delta_time: f64,
}

/// A single point on an event's backtrack window: the minimum needed to
/// recover an inflection's true index and altitude later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalSpeedSample {
    pub index: u64,
    pub clipped_vertical_speed: f64,
    pub corrected_altitude: f64,
}
