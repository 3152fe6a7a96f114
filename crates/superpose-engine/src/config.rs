//! Integration configuration, validation, and error types.
//!
//! [`IntegrationConfig`] is the input to
//! [`Integration::configure`](crate::integration::Integration::configure).
//! [`validate()`](IntegrationConfig::validate) checks every tolerance up
//! front so that a rejected configuration never installs anything.

use std::error::Error;
use std::fmt;

use superpose_core::StepperError;
use superpose_stepper::StepperKind;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating or applying a configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The requested step algorithm is unknown.
    Stepper(StepperError),
    /// A tolerance is NaN, infinite, zero, or negative.
    InvalidTolerance {
        /// Which parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// `epsilon_min` is not strictly below `epsilon_max`.
    EpsilonOrdering {
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },
    /// A relative accuracy bound exceeds 1.
    EpsilonOutOfRange {
        /// Which parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stepper(e) => write!(f, "stepper: {e}"),
            Self::InvalidTolerance { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            Self::EpsilonOrdering { min, max } => {
                write!(f, "epsilon_min ({min}) must be below epsilon_max ({max})")
            }
            Self::EpsilonOutOfRange { name, value } => {
                write!(f, "{name} must not exceed 1, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Stepper(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StepperError> for ConfigError {
    fn from(e: StepperError) -> Self {
        Self::Stepper(e)
    }
}

// ── AccuracyParameters ─────────────────────────────────────────────

/// The six tolerances that govern adaptive stepping.
///
/// Lengths are in millimetres; the epsilons are relative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccuracyParameters {
    /// Smallest step the chord finder will take. Default: 0.01.
    pub min_step: f64,
    /// Maximum sagitta between a curved step and its chord. Default: 3.0.
    pub delta_chord: f64,
    /// Positional accuracy of a single step. Default: 0.01.
    pub delta_one_step: f64,
    /// Accuracy of boundary intersection points. Default: 0.1.
    pub delta_intersection: f64,
    /// Lower bound on relative step accuracy. Default: 2.5e-7.
    pub epsilon_min: f64,
    /// Upper bound on relative step accuracy. Default: 0.05.
    pub epsilon_max: f64,
}

impl Default for AccuracyParameters {
    fn default() -> Self {
        Self {
            min_step: 0.01,
            delta_chord: 3.0,
            delta_one_step: 0.01,
            delta_intersection: 0.1,
            epsilon_min: 2.5e-7,
            epsilon_max: 0.05,
        }
    }
}

impl AccuracyParameters {
    /// Check that every tolerance is usable.
    ///
    /// All six must be finite and positive, `epsilon_min < epsilon_max`,
    /// and neither epsilon may exceed 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.named() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        for (name, value) in [
            ("epsilon_min", self.epsilon_min),
            ("epsilon_max", self.epsilon_max),
        ] {
            if value > 1.0 {
                return Err(ConfigError::EpsilonOutOfRange { name, value });
            }
        }
        if self.epsilon_min >= self.epsilon_max {
            return Err(ConfigError::EpsilonOrdering {
                min: self.epsilon_min,
                max: self.epsilon_max,
            });
        }
        Ok(())
    }

    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("min_step", self.min_step),
            ("delta_chord", self.delta_chord),
            ("delta_one_step", self.delta_one_step),
            ("delta_intersection", self.delta_intersection),
            ("epsilon_min", self.epsilon_min),
            ("epsilon_max", self.epsilon_max),
        ]
    }
}

impl fmt::Display for AccuracyParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min_step={} delta_chord={} delta_one_step={} delta_intersection={} \
             epsilon_min={} epsilon_max={}",
            self.min_step,
            self.delta_chord,
            self.delta_one_step,
            self.delta_intersection,
            self.epsilon_min,
            self.epsilon_max,
        )
    }
}

// ── IntegrationConfig ──────────────────────────────────────────────

/// Complete configuration for one integration setup.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntegrationConfig {
    /// Step algorithm. Default: [`StepperKind::ClassicalRk4`].
    pub stepper: StepperKind,
    /// Tolerances.
    pub accuracy: AccuracyParameters,
}

impl IntegrationConfig {
    /// Validate all invariants.
    ///
    /// The stepper kind is a closed enum and needs no check; raw
    /// identifiers are rejected where they are converted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.accuracy.validate()
    }
}
