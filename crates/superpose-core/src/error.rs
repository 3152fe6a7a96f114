//! Error types shared across the workspace.
//!
//! Organized by subsystem: bounding regions, stepper selection, and
//! trajectory stepping. Configuration errors live next to the
//! configuration they validate, in `superpose-engine`.

use std::error::Error;
use std::fmt;

use crate::field::Point;

/// Errors from constructing a [`BoundingBox`](crate::BoundingBox).
#[derive(Clone, Debug, PartialEq)]
pub enum BoundsError {
    /// A corner coordinate is NaN or infinite.
    NonFinite {
        /// The requested minimum corner.
        min: Point,
        /// The requested maximum corner.
        max: Point,
    },
    /// `min > max` on some axis.
    Inverted {
        /// Axis index (0 = x, 1 = y, 2 = z).
        axis: usize,
        /// Minimum on that axis.
        min: f64,
        /// Maximum on that axis.
        max: f64,
    },
}

impl fmt::Display for BoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { min, max } => {
                write!(f, "bounding box corners must be finite, got {min:?}..{max:?}")
            }
            Self::Inverted { axis, min, max } => {
                write!(f, "bounding box inverted on axis {axis}: min {min} > max {max}")
            }
        }
    }
}

impl Error for BoundsError {}

/// Errors from selecting a step algorithm.
///
/// Raised at the boundary where a raw identifier or name is converted
/// into a stepper kind, so an unknown choice never reaches stepper
/// construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepperError {
    /// A numeric stepper identifier outside the known range.
    UnknownKind {
        /// The rejected identifier.
        raw: u32,
    },
    /// A stepper name that matches no known algorithm.
    UnknownName {
        /// The rejected name.
        name: String,
    },
}

impl fmt::Display for StepperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind { raw } => write!(f, "unknown stepper identifier {raw}"),
            Self::UnknownName { name } => write!(f, "unknown stepper name '{name}'"),
        }
    }
}

impl Error for StepperError {}

/// Errors from advancing a trajectory state through the field.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackError {
    /// The requested step length is NaN, infinite, zero, or negative.
    InvalidStep {
        /// The rejected step length.
        value: f64,
    },
    /// The integrated state contains a non-finite component.
    NonFiniteState {
        /// Index of the first offending component.
        component: usize,
    },
    /// The trajectory was requested before any stepper was configured.
    NotConfigured,
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStep { value } => {
                write!(f, "step length must be finite and positive, got {value}")
            }
            Self::NonFiniteState { component } => {
                write!(f, "state component {component} became non-finite")
            }
            Self::NotConfigured => write!(f, "no chord finder installed"),
        }
    }
}

impl Error for TrackError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_display_names_value() {
        let msg = StepperError::UnknownKind { raw: 9 }.to_string();
        assert!(msg.contains('9'));
    }

    #[test]
    fn inverted_display_names_axis() {
        let msg = BoundsError::Inverted {
            axis: 2,
            min: 3.0,
            max: 1.0,
        }
        .to_string();
        assert!(msg.contains("axis 2"));
    }

    #[test]
    fn invalid_step_display() {
        let msg = TrackError::InvalidStep { value: -1.0 }.to_string();
        assert!(msg.contains("-1"));
    }
}
