//! Narrow error type for the detection core.
//!
//! Everything that isn't a structural anomaly (missing stages, GPS spikes,
//! hop-and-pop) is represented in-band as an `Output` pattern, never as an
//! `EngineError`. This type only exists for inputs the core cannot make
//! sense of at all.

use std::fmt;

/// Reason an input sample was rejected before it could be turned into
/// `Kinematics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInputReason {
    /// One of `altitude`, `north_speed`, `east_speed`, `vertical_speed` was
    /// NaN or infinite.
    NonFiniteField,
    /// The sample's timestamp did not advance past the previous sample's.
    NonMonotonicTimestamp,
}

impl fmt::Display for InvalidInputReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidInputReason::NonFiniteField => write!(f, "non-finite field (NaN or infinite)"),
            InvalidInputReason::NonMonotonicTimestamp => {
                write!(f, "timestamp did not advance past the previous sample")
            }
        }
    }
}

/// The only failure mode the detection core can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    InvalidInput {
        index: u64,
        reason: InvalidInputReason,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidInput { index, reason } => {
                write!(f, "invalid input at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_index_and_reason() {
        let err = EngineError::InvalidInput {
            index: 42,
            reason: InvalidInputReason::NonMonotonicTimestamp,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("42"));
        assert!(rendered.contains("did not advance"));
    }
}
