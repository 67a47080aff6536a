//! Event and phase sum types. Tagged variants, not an inheritance
//! hierarchy: there is no runtime dispatch anywhere in this module.

use serde::{Deserialize, Serialize};

/// The four event types a jump profile can contain, in detection priority
/// order (also their dependency order: each later event requires the
/// ones before it to be eligible, per the ordering invariants in §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Takeoff,
    Freefall,
    Canopy,
    Landing,
}

impl EventType {
    pub const ALL_IN_PRIORITY_ORDER: [EventType; 4] = [
        EventType::Takeoff,
        EventType::Freefall,
        EventType::Canopy,
        EventType::Landing,
    ];
}

/// An instantaneous transition, attached to the row at which it physically
/// occurred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightEvent {
    pub index: u64,
    pub altitude: f64,
}

/// The four independent optional event slots discovered so far.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectedEvents {
    pub takeoff: Option<FlightEvent>,
    pub freefall: Option<FlightEvent>,
    pub canopy: Option<FlightEvent>,
    pub landing: Option<FlightEvent>,
}

impl DetectedEvents {
    pub fn get(&self, event_type: EventType) -> Option<FlightEvent> {
        match event_type {
            EventType::Takeoff => self.takeoff,
            EventType::Freefall => self.freefall,
            EventType::Canopy => self.canopy,
            EventType::Landing => self.landing,
        }
    }

    pub fn with_set(&self, event_type: EventType, event: FlightEvent) -> Self {
        let mut updated = *self;
        match event_type {
            EventType::Takeoff => updated.takeoff = Some(event),
            EventType::Freefall => updated.freefall = Some(event),
            EventType::Canopy => updated.canopy = Some(event),
            EventType::Landing => updated.landing = Some(event),
        }
        updated
    }

    /// Whether `event_type` is eligible to be detected next, per the
    /// ordering invariants: freefall needs takeoff absent-or-earlier,
    /// canopy needs freefall set, landing needs canopy-or-takeoff set.
    /// Takeoff has no predecessor requirement beyond not already being set.
    pub fn is_eligible(&self, event_type: EventType) -> bool {
        match event_type {
            EventType::Takeoff => self.takeoff.is_none(),
            EventType::Freefall => self.freefall.is_none(),
            EventType::Canopy => self.canopy.is_none() && self.freefall.is_some(),
            EventType::Landing => {
                self.landing.is_none() && (self.canopy.is_some() || self.takeoff.is_some())
            }
        }
    }
}

/// Ordered flight phase, derived deterministically from `DetectedEvents`
/// as the highest phase whose preceding event is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightPhase {
    BeforeTakeoff,
    Climbing,
    Freefall,
    UnderCanopy,
    Landed,
}

impl FlightPhase {
    pub fn from_detected_events(events: &DetectedEvents) -> Self {
        if events.landing.is_some() {
            FlightPhase::Landed
        } else if events.canopy.is_some() {
            FlightPhase::UnderCanopy
        } else if events.freefall.is_some() {
            FlightPhase::Freefall
        } else if events.takeoff.is_some() {
            FlightPhase::Climbing
        } else {
            FlightPhase::BeforeTakeoff
        }
    }
}
