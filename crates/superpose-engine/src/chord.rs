//! Chord-deviation-bounded step search.
//!
//! The transport side intersects trajectories with geometry by straight
//! chords. A step is only usable if the true curved path stays within
//! `delta_chord` of its chord; [`ChordFinder::find_next_chord`] shrinks the
//! trial step until that holds or the minimum step is reached.

use superpose_core::{FieldEvaluator, Point, TrackError};
use superpose_stepper::{first_non_finite, position, State, Stepper, STATE_WIDTH};

/// Chord tolerance of a freshly constructed finder, in millimetres.
pub const DEFAULT_DELTA_CHORD: f64 = 0.25;

/// Result of a successful chord search.
#[derive(Clone, Debug, PartialEq)]
pub struct ChordStep {
    /// Accepted step length.
    pub step_length: f64,
    /// State at the end of the accepted step.
    pub end_state: State,
    /// The stepper's error estimate for that step.
    pub error: State,
    /// Distance of the mid-step position from the start→end chord.
    pub chord_deviation: f64,
}

impl ChordStep {
    /// Largest absolute component of the error estimate.
    pub fn max_error(&self) -> f64 {
        self.error.iter().fold(0.0f64, |m, e| m.max(e.abs()))
    }
}

/// Owns a stepper and the chord tolerance it is driven under.
pub struct ChordFinder {
    stepper: Box<dyn Stepper>,
    min_step: f64,
    delta_chord: f64,
}

impl ChordFinder {
    /// Bind `stepper` with the smallest admissible step `min_step`.
    pub fn new(min_step: f64, stepper: Box<dyn Stepper>) -> Self {
        Self {
            stepper,
            min_step,
            delta_chord: DEFAULT_DELTA_CHORD,
        }
    }

    /// Set the maximum allowed chord deviation.
    pub fn set_delta_chord(&mut self, delta_chord: f64) {
        self.delta_chord = delta_chord;
    }

    /// The maximum allowed chord deviation.
    pub fn delta_chord(&self) -> f64 {
        self.delta_chord
    }

    /// The smallest step the search will shrink to.
    pub fn min_step(&self) -> f64 {
        self.min_step
    }

    /// The bound stepper.
    pub fn stepper(&self) -> &dyn Stepper {
        &*self.stepper
    }

    /// Find the longest step up to `trial_step` whose chord deviation is
    /// within tolerance.
    ///
    /// Halves the step on each rejection. A step at or below `min_step`
    /// is accepted regardless of its deviation.
    ///
    /// # Errors
    ///
    /// [`TrackError::InvalidStep`] if `trial_step` is not finite and
    /// positive; [`TrackError::NonFiniteState`] if `y` or any integrated
    /// state contains NaN or infinity.
    pub fn find_next_chord(
        &self,
        fields: &mut dyn FieldEvaluator,
        y: &State,
        trial_step: f64,
    ) -> Result<ChordStep, TrackError> {
        if !trial_step.is_finite() || trial_step <= 0.0 {
            return Err(TrackError::InvalidStep { value: trial_step });
        }
        if let Some(component) = first_non_finite(y) {
            return Err(TrackError::NonFiniteState { component });
        }

        let mut dydx = [0.0; STATE_WIDTH];
        self.stepper.derivatives(fields, y, &mut dydx);

        let start = position(y);
        let mut y_end = [0.0; STATE_WIDTH];
        let mut y_err = [0.0; STATE_WIDTH];
        let mut y_mid = [0.0; STATE_WIDTH];
        let mut mid_err = [0.0; STATE_WIDTH];
        let mut h = trial_step;
        loop {
            self.stepper
                .step(fields, y, &dydx, h, &mut y_end, &mut y_err);
            if let Some(component) = first_non_finite(&y_end) {
                return Err(TrackError::NonFiniteState { component });
            }
            self.stepper
                .step(fields, y, &dydx, 0.5 * h, &mut y_mid, &mut mid_err);
            if let Some(component) = first_non_finite(&y_mid) {
                return Err(TrackError::NonFiniteState { component });
            }

            let deviation = distance_to_line(&position(&y_mid), &start, &position(&y_end));
            if deviation <= self.delta_chord || h <= self.min_step {
                return Ok(ChordStep {
                    step_length: h,
                    end_state: y_end,
                    error: y_err,
                    chord_deviation: deviation,
                });
            }
            h = (0.5 * h).max(self.min_step);
        }
    }
}

impl std::fmt::Debug for ChordFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChordFinder")
            .field("stepper", &self.stepper.kind())
            .field("min_step", &self.min_step)
            .field("delta_chord", &self.delta_chord)
            .finish()
    }
}

/// Perpendicular distance of `p` from the line through `a` and `b`.
///
/// Degenerates to `|p - a|` when `a == b`.
fn distance_to_line(p: &Point, a: &Point, b: &Point) -> f64 {
    let ab = sub(b, a);
    let ap = sub(p, a);
    let len2 = dot(&ab, &ab);
    if len2 == 0.0 {
        return dot(&ap, &ap).sqrt();
    }
    let c = cross(&ap, &ab);
    (dot(&c, &c) / len2).sqrt()
}

fn sub(a: &Point, b: &Point) -> Point {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: &Point, b: &Point) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: &Point, b: &Point) -> Point {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use superpose_core::FieldVector;
    use superpose_stepper::{
        build_stepper, state_from, LorentzEquation, StepperKind, C_LIGHT,
    };
    use superpose_test_utils::MockEvaluator;

    fn finder(min_step: f64, delta_chord: f64) -> ChordFinder {
        let stepper = build_stepper(
            StepperKind::ClassicalRk4,
            Arc::new(LorentzEquation::proton()),
        );
        let mut f = ChordFinder::new(min_step, stepper);
        f.set_delta_chord(delta_chord);
        f
    }

    fn bending_field() -> MockEvaluator {
        MockEvaluator::new(FieldVector::magnetic_only([0.0, 0.0, 1.0]))
    }

    #[test]
    fn distance_to_line_cases() {
        assert_relative_eq!(
            distance_to_line(&[1.0, 1.0, 0.0], &[0.0; 3], &[2.0, 0.0, 0.0]),
            1.0
        );
        assert_relative_eq!(
            distance_to_line(&[3.0, 4.0, 0.0], &[0.0; 3], &[0.0; 3]),
            5.0
        );
    }

    #[test]
    fn straight_track_accepts_full_step() {
        let f = finder(0.01, 0.25);
        let mut fields = MockEvaluator::zero();
        let y = state_from([0.0; 3], [0.0, 0.0, 50.0]);
        let chord = f.find_next_chord(&mut fields, &y, 1000.0).unwrap();
        assert_eq!(chord.step_length, 1000.0);
        assert!(chord.chord_deviation < 1e-9);
        assert_relative_eq!(chord.end_state[2], 1000.0, epsilon = 1e-9);
        assert!(chord.max_error() < 1e-9);
    }

    #[test]
    fn curved_track_shrinks_until_within_delta_chord() {
        let f = finder(0.01, 0.25);
        let mut fields = bending_field();
        let y = state_from([0.0; 3], [100.0, 0.0, 0.0]);
        let chord = f.find_next_chord(&mut fields, &y, 200.0).unwrap();
        assert!(chord.step_length < 200.0);
        assert!(chord.chord_deviation <= 0.25, "{chord:?}");
        let largest = chord.error.iter().fold(0.0f64, |m, e| m.max(e.abs()));
        assert!(chord.max_error() > 0.0);
        assert_eq!(chord.max_error(), largest);

        // Sagitta of an arc of length s on radius R is about s²/(8R).
        let r = 100.0 / C_LIGHT;
        let s = chord.step_length;
        assert_relative_eq!(chord.chord_deviation, s * s / (8.0 * r), max_relative = 0.05);
    }

    #[test]
    fn min_step_floor_is_accepted_regardless() {
        let f = finder(5.0, 1e-9);
        let mut fields = bending_field();
        let y = state_from([0.0; 3], [100.0, 0.0, 0.0]);
        let chord = f.find_next_chord(&mut fields, &y, 80.0).unwrap();
        assert_eq!(chord.step_length, 5.0);
        assert!(chord.chord_deviation > 1e-9);
    }

    #[test]
    fn trial_below_min_step_is_taken_as_is() {
        let f = finder(1.0, 1e-9);
        let mut fields = bending_field();
        let y = state_from([0.0; 3], [100.0, 0.0, 0.0]);
        let chord = f.find_next_chord(&mut fields, &y, 0.5).unwrap();
        assert_eq!(chord.step_length, 0.5);
    }

    #[test]
    fn invalid_trial_step_is_rejected() {
        let f = finder(0.01, 0.25);
        let y = state_from([0.0; 3], [100.0, 0.0, 0.0]);
        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            match f.find_next_chord(&mut MockEvaluator::zero(), &y, bad) {
                Err(TrackError::InvalidStep { .. }) => {}
                other => panic!("expected InvalidStep, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_finite_state_is_rejected() {
        let f = finder(0.01, 0.25);
        let mut y = state_from([0.0; 3], [100.0, 0.0, 0.0]);
        y[4] = f64::NAN;
        match f.find_next_chord(&mut MockEvaluator::zero(), &y, 1.0) {
            Err(TrackError::NonFiniteState { component: 4 }) => {}
            other => panic!("expected NonFiniteState, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_field_surfaces_as_track_error() {
        let f = finder(0.01, 0.25);
        let mut fields = MockEvaluator::new(FieldVector::magnetic_only([f64::INFINITY, 0.0, 0.0]));
        let y = state_from([0.0; 3], [0.0, 100.0, 0.0]);
        match f.find_next_chord(&mut fields, &y, 1.0) {
            Err(TrackError::NonFiniteState { .. }) => {}
            other => panic!("expected NonFiniteState, got {other:?}"),
        }
    }

    /// Straight-line stepper that breaks down for steps shorter than
    /// `fails_below`.
    struct ShortStepFails {
        equation: LorentzEquation,
        fails_below: f64,
    }

    impl Stepper for ShortStepFails {
        fn kind(&self) -> StepperKind {
            StepperKind::ExplicitEuler
        }

        fn equation(&self) -> &dyn superpose_stepper::EquationOfMotion {
            &self.equation
        }

        fn step(
            &self,
            _fields: &mut dyn FieldEvaluator,
            y: &State,
            dydx: &State,
            h: f64,
            y_out: &mut State,
            y_err: &mut State,
        ) {
            for i in 0..STATE_WIDTH {
                y_out[i] = y[i] + h * dydx[i];
                y_err[i] = 0.0;
            }
            if h < self.fails_below {
                y_out[1] = f64::NAN;
            }
        }
    }

    #[test]
    fn non_finite_midpoint_is_rejected() {
        let stepper = ShortStepFails {
            equation: LorentzEquation::proton(),
            fails_below: 10.0,
        };
        let f = ChordFinder::new(0.01, Box::new(stepper));
        let y = state_from([0.0; 3], [0.0, 0.0, 100.0]);
        match f.find_next_chord(&mut MockEvaluator::zero(), &y, 16.0) {
            Err(TrackError::NonFiniteState { component: 1 }) => {}
            other => panic!("expected NonFiniteState at component 1, got {other:?}"),
        }
    }
}
