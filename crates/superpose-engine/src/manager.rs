//! Field manager and propagator settings.
//!
//! Together these hold everything the transport side needs besides the
//! field itself: the installed chord finder, the per-step and
//! intersection accuracies, and the relative accuracy bounds.

use log::debug;
use superpose_core::{FieldEvaluator, TrackError};
use superpose_stepper::State;

use crate::chord::{ChordFinder, ChordStep};

/// Ratio of the intersection accuracy to the one-step accuracy applied by
/// [`FieldManager::set_accuracies_with_delta_one_step`].
pub const DELTA_INTERSECTION_RATIO: f64 = 0.4;

/// Holds the chord finder and the positional accuracies.
#[derive(Debug)]
pub struct FieldManager {
    chord_finder: Option<ChordFinder>,
    delta_one_step: f64,
    delta_intersection: f64,
    field_changes_energy: bool,
}

impl Default for FieldManager {
    fn default() -> Self {
        Self {
            chord_finder: None,
            delta_one_step: 0.01,
            delta_intersection: 0.001,
            field_changes_energy: false,
        }
    }
}

impl FieldManager {
    /// A manager with no chord finder and stock accuracies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the one-step accuracy, and reset the intersection accuracy to
    /// [`DELTA_INTERSECTION_RATIO`] of it.
    pub fn set_accuracies_with_delta_one_step(&mut self, delta_one_step: f64) {
        self.delta_one_step = delta_one_step;
        self.delta_intersection = DELTA_INTERSECTION_RATIO * delta_one_step;
    }

    /// Override the intersection accuracy.
    pub fn set_delta_intersection(&mut self, delta_intersection: f64) {
        self.delta_intersection = delta_intersection;
    }

    /// Declare whether the field can change particle energy (electric or
    /// time-varying components).
    pub fn set_field_changes_energy(&mut self, changes: bool) {
        self.field_changes_energy = changes;
    }

    /// Install `chord_finder`, replacing any previous one.
    pub fn set_chord_finder(&mut self, chord_finder: ChordFinder) {
        if self.chord_finder.is_some() {
            debug!("replacing installed chord finder");
        }
        self.chord_finder = Some(chord_finder);
    }

    /// One-step positional accuracy (mm).
    pub fn delta_one_step(&self) -> f64 {
        self.delta_one_step
    }

    /// Boundary intersection accuracy (mm).
    pub fn delta_intersection(&self) -> f64 {
        self.delta_intersection
    }

    /// Whether the field is marked as energy-changing.
    pub fn field_changes_energy(&self) -> bool {
        self.field_changes_energy
    }

    /// The installed chord finder, if any.
    pub fn chord_finder(&self) -> Option<&ChordFinder> {
        self.chord_finder.as_ref()
    }

    /// Run the installed chord finder.
    ///
    /// # Errors
    ///
    /// [`TrackError::NotConfigured`] without a chord finder, otherwise
    /// whatever [`ChordFinder::find_next_chord`] reports.
    pub fn find_next_chord(
        &self,
        fields: &mut dyn FieldEvaluator,
        y: &State,
        trial_step: f64,
    ) -> Result<ChordStep, TrackError> {
        self.chord_finder
            .as_ref()
            .ok_or(TrackError::NotConfigured)?
            .find_next_chord(fields, y, trial_step)
    }
}

/// Relative accuracy bounds applied by the propagator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropagatorSettings {
    epsilon_min: f64,
    epsilon_max: f64,
}

impl Default for PropagatorSettings {
    fn default() -> Self {
        Self {
            epsilon_min: 5.0e-5,
            epsilon_max: 1.0e-3,
        }
    }
}

impl PropagatorSettings {
    /// Settings with the given bounds. Callers validate beforehand.
    pub fn new(epsilon_min: f64, epsilon_max: f64) -> Self {
        Self {
            epsilon_min,
            epsilon_max,
        }
    }

    /// Lower bound on relative step accuracy.
    pub fn minimum_epsilon_step(&self) -> f64 {
        self.epsilon_min
    }

    /// Upper bound on relative step accuracy.
    pub fn maximum_epsilon_step(&self) -> f64 {
        self.epsilon_max
    }

    /// Relative accuracy for a step of `step_length`.
    ///
    /// `delta_one_step / step_length`, clamped to the epsilon bounds. A
    /// non-positive step gets the upper bound.
    pub fn epsilon_for(&self, delta_one_step: f64, step_length: f64) -> f64 {
        if step_length <= 0.0 {
            return self.epsilon_max;
        }
        (delta_one_step / step_length).clamp(self.epsilon_min, self.epsilon_max)
    }
}
