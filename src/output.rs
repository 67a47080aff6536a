//! Output row assembly: turning a processed sample's detected events into
//! the annotated row external adapters serialize.

use serde::{Deserialize, Serialize};

use crate::events::{DetectedEvents, FlightPhase};

/// One annotated output row, carrying the opaque `source` payload the
/// engine never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Output<S> {
    pub index: u64,
    pub phase: FlightPhase,
    #[serde(flatten)]
    pub events: DetectedEvents,
    pub source: S,
}

/// Assemble an output row from a processed sample's index, its detected
/// events so far, and the carried source payload. Phase is always
/// recomputed from `events` rather than stored independently, so the two
/// can never drift apart.
pub fn assemble<S>(index: u64, events: DetectedEvents, source: S) -> Output<S> {
    Output {
        index,
        phase: FlightPhase::from_detected_events(&events),
        events,
        source,
    }
}
