//! The aggregate field and its reconfiguration lifecycle.
//!
//! [`GlobalField`] owns the [`FieldRegistry`] and the active
//! [`Integration`]. Configuration changes are staged on a pending
//! [`IntegrationConfig`] and take effect on [`GlobalField::apply`], which
//! rebuilds the whole integration setup and empties the registry.

use std::sync::Arc;

use log::{error, info};
use smallvec::SmallVec;
use superpose_core::{FieldEvaluator, FieldSource, FieldVector, Point, SourceId, TrackError};
use superpose_field::FieldRegistry;
use superpose_stepper::{EquationOfMotion, LorentzEquation, State, StepperKind};

use crate::chord::ChordStep;
use crate::config::{AccuracyParameters, ConfigError, IntegrationConfig};
use crate::integration::Integration;
use crate::manager::{FieldManager, PropagatorSettings};

/// The composite electromagnetic field and the integrator configured
/// to track through it.
///
/// One instance per worker. Every mutation takes `&mut self`, so
/// registration can never race with evaluation.
///
/// # Example
///
/// ```
/// use superpose_core::{BoundingBox, FieldVector};
/// use superpose_engine::GlobalField;
/// use superpose_field::UniformField;
/// use superpose_stepper::StepperKind;
///
/// let mut field = GlobalField::new();
/// field.add_source(UniformField::new(
///     BoundingBox::cube(0.0, 10.0).unwrap(),
///     FieldVector::magnetic_only([0.0, 0.0, 1.5]),
/// ));
/// assert_eq!(field.evaluate(&[5.0, 5.0, 5.0]).magnetic(), [0.0, 0.0, 1.5]);
///
/// field.set_stepper(StepperKind::CashKarpRkf45);
/// field.apply().unwrap();
/// assert_eq!(field.integration().stepper_kind(), StepperKind::CashKarpRkf45);
/// assert!(field.evaluate(&[5.0, 5.0, 5.0]).is_zero());
/// ```
pub struct GlobalField {
    registry: FieldRegistry,
    pending: IntegrationConfig,
    equation: Arc<dyn EquationOfMotion>,
    integration: Integration,
}

impl GlobalField {
    /// An empty field with the default configuration: classical RK4,
    /// default accuracies, proton Lorentz equation.
    pub fn new() -> Self {
        let equation: Arc<dyn EquationOfMotion> = Arc::new(LorentzEquation::default());
        let integration = Integration::with_defaults(Arc::clone(&equation));
        Self {
            registry: FieldRegistry::new(),
            pending: IntegrationConfig::default(),
            equation,
            integration,
        }
    }

    /// An empty field configured from `config` with `equation`.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from validating `config`.
    pub fn with_config(
        config: IntegrationConfig,
        equation: Arc<dyn EquationOfMotion>,
    ) -> Result<Self, ConfigError> {
        let integration = Integration::configure(config, Arc::clone(&equation))?;
        Ok(Self {
            registry: FieldRegistry::new(),
            pending: config,
            equation,
            integration,
        })
    }

    // ── Sources ────────────────────────────────────────────────────

    /// Register a source. Takes effect on the next evaluation.
    pub fn add_source<S: FieldSource>(&mut self, source: S) -> SourceId {
        self.registry.register(source)
    }

    /// Register an already boxed source.
    pub fn add_boxed_source(&mut self, source: Box<dyn FieldSource>) -> SourceId {
        self.registry.register_boxed(source)
    }

    /// Unregister one source. Returns `false` if `id` is unknown.
    pub fn remove_source(&mut self, id: SourceId) -> bool {
        self.registry.remove(id)
    }

    /// Unregister every source.
    pub fn remove_all(&mut self) {
        self.registry.clear();
    }

    /// Number of registered sources.
    pub fn source_count(&self) -> usize {
        self.registry.len()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Rebuild the evaluation snapshot now rather than on the next read.
    pub fn commit(&mut self) {
        self.registry.commit();
    }

    // ── Evaluation ─────────────────────────────────────────────────

    /// The superposed field at `point`.
    ///
    /// Zero if any coordinate is NaN or infinite.
    #[inline]
    pub fn evaluate(&mut self, point: &Point) -> FieldVector {
        self.registry.evaluate(point)
    }

    /// IDs of the sources contributing at `point`.
    pub fn contributors(&mut self, point: &Point) -> SmallVec<[SourceId; 8]> {
        self.registry.contributors(point)
    }

    // ── Configuration ──────────────────────────────────────────────

    /// Stage a step algorithm for the next [`apply`](Self::apply).
    pub fn set_stepper(&mut self, kind: StepperKind) {
        self.pending.stepper = kind;
    }

    /// Stage a step algorithm by raw identifier `0..=5`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Stepper`] for an unknown identifier; the pending
    /// choice is left unchanged.
    pub fn set_stepper_id(&mut self, raw: u32) -> Result<(), ConfigError> {
        match StepperKind::try_from(raw) {
            Ok(kind) => {
                self.pending.stepper = kind;
                Ok(())
            }
            Err(e) => {
                error!("rejected stepper selection: {e}");
                Err(e.into())
            }
        }
    }

    /// Stage new tolerances for the next [`apply`](Self::apply).
    ///
    /// # Errors
    ///
    /// The validation error; the pending tolerances are left unchanged.
    pub fn set_accuracy_parameters(
        &mut self,
        accuracy: AccuracyParameters,
    ) -> Result<(), ConfigError> {
        if let Err(e) = accuracy.validate() {
            error!("rejected accuracy parameters: {e}");
            return Err(e);
        }
        self.pending.accuracy = accuracy;
        Ok(())
    }

    /// Stage a different equation of motion for the next
    /// [`apply`](Self::apply).
    pub fn set_equation(&mut self, equation: Arc<dyn EquationOfMotion>) {
        self.equation = equation;
    }

    /// The configuration [`apply`](Self::apply) will install.
    pub fn pending_config(&self) -> &IntegrationConfig {
        &self.pending
    }

    /// The integration setup currently in force.
    pub fn integration(&self) -> &Integration {
        &self.integration
    }

    /// Rebuild the integration setup from the pending configuration and
    /// reset the registry.
    ///
    /// All-or-nothing: on error the registry and the active integration
    /// are untouched.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`Integration::configure`].
    pub fn apply(&mut self) -> Result<(), ConfigError> {
        self.reconfigure(self.pending)
    }

    /// Stage `config` and [`apply`](Self::apply) it in one go.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`Integration::configure`]. On error the
    /// pending configuration, the registry, and the active integration
    /// are all left as they were.
    pub fn reconfigure(&mut self, config: IntegrationConfig) -> Result<(), ConfigError> {
        let integration = Integration::configure(config, Arc::clone(&self.equation))?;
        let released = self.registry.len();
        self.registry.clear();
        self.pending = config;
        self.integration = integration;
        info!(
            "field reconfigured with {}; {released} sources released",
            config.stepper
        );
        Ok(())
    }

    /// Borrow the field and its integration setup for tracking.
    pub fn propagation(&mut self) -> Propagation<'_> {
        Propagation {
            fields: &mut self.registry,
            integration: &self.integration,
        }
    }
}

impl Default for GlobalField {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldEvaluator for GlobalField {
    #[inline]
    fn field_value(&mut self, point: &Point) -> FieldVector {
        self.evaluate(point)
    }
}

impl std::fmt::Debug for GlobalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalField")
            .field("registry", &self.registry)
            .field("pending", &self.pending)
            .field("integration", &self.integration)
            .finish()
    }
}

/// A non-owning handle for the transport side.
///
/// Bundles the field evaluator with the active field manager and
/// propagator settings. Borrowing from [`GlobalField`] means it cannot
/// outlive it, nor coexist with a reconfiguration.
pub struct Propagation<'a> {
    fields: &'a mut FieldRegistry,
    integration: &'a Integration,
}

impl Propagation<'_> {
    /// The field manager in force.
    pub fn field_manager(&self) -> &FieldManager {
        self.integration.field_manager()
    }

    /// The propagator's relative accuracy bounds.
    pub fn settings(&self) -> &PropagatorSettings {
        self.integration.propagator_settings()
    }

    /// Relative accuracy for a step of `step_length` under the active
    /// one-step accuracy.
    pub fn epsilon_for(&self, step_length: f64) -> f64 {
        self.settings()
            .epsilon_for(self.field_manager().delta_one_step(), step_length)
    }

    /// Search for the next chord from `y`; see
    /// [`ChordFinder::find_next_chord`](crate::ChordFinder::find_next_chord).
    pub fn find_next_chord(&mut self, y: &State, trial_step: f64) -> Result<ChordStep, TrackError> {
        self.integration
            .field_manager()
            .find_next_chord(&mut *self.fields, y, trial_step)
    }
}

impl FieldEvaluator for Propagation<'_> {
    #[inline]
    fn field_value(&mut self, point: &Point) -> FieldVector {
        self.fields.evaluate(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use superpose_core::BoundingBox;
    use superpose_stepper::state_from;
    use superpose_test_utils::{fixtures, ConstSource};

    fn example_field() -> GlobalField {
        let mut field = GlobalField::new();
        let (a, b) = fixtures::two_overlapping_boxes();
        field.add_source(a);
        field.add_source(b);
        field
    }

    #[test]
    fn is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<GlobalField>();
    }

    #[test]
    fn new_field_is_default_configured() {
        let field = GlobalField::new();
        assert_eq!(field.integration().stepper_kind(), StepperKind::ClassicalRk4);
        assert_eq!(field.integration().accuracy(), &AccuracyParameters::default());
        assert_eq!(field.source_count(), 0);
    }

    #[test]
    fn example_scenario() {
        let mut field = example_field();
        assert_eq!(field.evaluate(&[2.0, 2.0, 2.0]).magnetic(), [1.0, 0.0, 0.0]);
        assert_eq!(field.evaluate(&[7.0, 7.0, 7.0]).magnetic(), [1.0, 2.0, 0.0]);
        assert!(field.evaluate(&[20.0, 20.0, 20.0]).is_zero());
        assert!(field.evaluate(&[f64::NAN, 7.0, 7.0]).is_zero());
    }

    #[test]
    fn remove_all_zeroes_everywhere() {
        let mut field = example_field();
        field.remove_all();
        assert!(field.evaluate(&[7.0, 7.0, 7.0]).is_zero());
    }

    #[test]
    fn remove_source_drops_one_contribution() {
        let mut field = GlobalField::new();
        let (a, b) = fixtures::two_overlapping_boxes();
        let id_a = field.add_source(a);
        field.add_source(b);
        assert!(field.remove_source(id_a));
        assert_eq!(field.evaluate(&[7.0, 7.0, 7.0]).magnetic(), [0.0, 2.0, 0.0]);
    }

    #[test]
    fn out_of_range_stepper_id_is_misconfiguration() {
        let mut field = GlobalField::new();
        field.set_stepper(StepperKind::SimpleHeum);
        match field.set_stepper_id(6) {
            Err(ConfigError::Stepper(_)) => {}
            other => panic!("expected Stepper error, got {other:?}"),
        }
        assert_eq!(field.pending_config().stepper, StepperKind::SimpleHeum);
    }

    #[test]
    fn stepper_ids_select_kinds() {
        let mut field = GlobalField::new();
        for raw in 0..6 {
            field.set_stepper_id(raw).unwrap();
            field.apply().unwrap();
            let cf = field.integration().chord_finder().unwrap();
            assert_eq!(cf.stepper().kind().id(), raw);
            assert_eq!(cf.stepper().state_width(), 12);
        }
    }

    #[test]
    fn configuration_waits_for_apply() {
        let mut field = GlobalField::new();
        field.set_stepper(StepperKind::ExplicitEuler);
        assert_eq!(field.integration().stepper_kind(), StepperKind::ClassicalRk4);
        field.apply().unwrap();
        assert_eq!(field.integration().stepper_kind(), StepperKind::ExplicitEuler);
    }

    #[test]
    fn invalid_accuracy_is_rejected_eagerly() {
        let mut field = GlobalField::new();
        let bad = AccuracyParameters {
            epsilon_min: 0.5,
            epsilon_max: 0.1,
            ..AccuracyParameters::default()
        };
        assert!(field.set_accuracy_parameters(bad).is_err());
        assert_eq!(field.pending_config().accuracy, AccuracyParameters::default());
    }

    #[test]
    fn apply_clears_registry_and_installs_new_setup() {
        let mut field = example_field();
        let accuracy = AccuracyParameters {
            delta_chord: 0.5,
            ..AccuracyParameters::default()
        };
        field.set_accuracy_parameters(accuracy).unwrap();
        field.apply().unwrap();
        assert_eq!(field.source_count(), 0);
        assert!(field.evaluate(&[7.0, 7.0, 7.0]).is_zero());
        assert_eq!(field.integration().chord_finder().unwrap().delta_chord(), 0.5);

        let (a, _) = fixtures::two_overlapping_boxes();
        field.add_source(a);
        assert_eq!(field.evaluate(&[7.0, 7.0, 7.0]).magnetic(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn with_config_rejects_invalid() {
        let config = IntegrationConfig {
            accuracy: AccuracyParameters {
                delta_one_step: f64::NAN,
                ..AccuracyParameters::default()
            },
            ..IntegrationConfig::default()
        };
        match GlobalField::with_config(config, Arc::new(LorentzEquation::proton())) {
            Err(ConfigError::InvalidTolerance { name: "delta_one_step", .. }) => {}
            other => panic!("expected InvalidTolerance, got {other:?}"),
        }
    }

    #[test]
    fn propagation_tracks_through_registered_field() {
        let mut field = GlobalField::new();
        field.add_source(ConstSource::new(
            "dipole",
            BoundingBox::cube(-1000.0, 1000.0).unwrap(),
            FieldVector::magnetic_only([0.0, 0.0, 1.0]),
        ));
        let mut propagation = field.propagation();
        assert_eq!(propagation.field_value(&[0.0; 3]).magnetic(), [0.0, 0.0, 1.0]);

        let y = state_from([0.0; 3], [100.0, 0.0, 0.0]);
        let chord = propagation.find_next_chord(&y, 500.0).unwrap();
        assert!(chord.chord_deviation <= 3.0);
        assert!(chord.step_length < 500.0);
        assert!(chord.end_state[1] < 0.0);

        let eps = propagation.epsilon_for(chord.step_length);
        assert!(eps >= propagation.settings().minimum_epsilon_step());
        assert!(eps <= propagation.settings().maximum_epsilon_step());
    }
}
