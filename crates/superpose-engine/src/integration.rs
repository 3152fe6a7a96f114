//! Assembly of stepper, chord finder, field manager and propagator
//! settings from one [`IntegrationConfig`].

use std::sync::Arc;

use log::{error, info};
use superpose_stepper::{build_stepper, EquationOfMotion, StepperKind};

use crate::chord::ChordFinder;
use crate::config::{AccuracyParameters, ConfigError, IntegrationConfig};
use crate::manager::{FieldManager, PropagatorSettings};

/// A fully wired integration setup.
///
/// Built as a unit by [`configure`](Integration::configure) and replaced
/// as a unit on reconfiguration; there is no way to swap a single piece.
pub struct Integration {
    config: IntegrationConfig,
    equation: Arc<dyn EquationOfMotion>,
    field_manager: FieldManager,
    propagator: PropagatorSettings,
}

impl Integration {
    /// Validate `config` and build every component from it.
    ///
    /// In order: the stepper for the selected kind over the 12-wide state,
    /// a chord finder bound to `min_step` and that stepper with
    /// `delta_chord` applied, the field manager's one-step accuracy (which
    /// also resets the intersection accuracy) followed by the explicit
    /// intersection accuracy, the epsilon bounds, and the energy-changing
    /// flag. The chord finder is installed last.
    ///
    /// # Errors
    ///
    /// Returns the validation error unchanged; nothing is built.
    pub fn configure(
        config: IntegrationConfig,
        equation: Arc<dyn EquationOfMotion>,
    ) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            error!("rejected integration configuration: {e}");
            return Err(e);
        }
        Ok(Self::assemble(config, equation))
    }

    /// The default configuration, which is always valid.
    pub(crate) fn with_defaults(equation: Arc<dyn EquationOfMotion>) -> Self {
        Self::assemble(IntegrationConfig::default(), equation)
    }

    fn assemble(config: IntegrationConfig, equation: Arc<dyn EquationOfMotion>) -> Self {
        let accuracy = config.accuracy;
        let stepper = build_stepper(config.stepper, Arc::clone(&equation));

        let mut chord_finder = ChordFinder::new(accuracy.min_step, stepper);
        chord_finder.set_delta_chord(accuracy.delta_chord);

        let mut field_manager = FieldManager::new();
        field_manager.set_accuracies_with_delta_one_step(accuracy.delta_one_step);
        field_manager.set_delta_intersection(accuracy.delta_intersection);
        field_manager.set_field_changes_energy(true);

        let propagator = PropagatorSettings::new(accuracy.epsilon_min, accuracy.epsilon_max);

        info!("accuracy parameters: {accuracy}");
        field_manager.set_chord_finder(chord_finder);

        Self {
            config,
            equation,
            field_manager,
            propagator,
        }
    }

    /// The configuration this setup was built from.
    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    /// The selected step algorithm.
    pub fn stepper_kind(&self) -> StepperKind {
        self.config.stepper
    }

    /// The tolerances in force.
    pub fn accuracy(&self) -> &AccuracyParameters {
        &self.config.accuracy
    }

    /// The equation of motion the stepper integrates.
    pub fn equation(&self) -> &Arc<dyn EquationOfMotion> {
        &self.equation
    }

    /// The field manager holding the installed chord finder.
    pub fn field_manager(&self) -> &FieldManager {
        &self.field_manager
    }

    /// The installed chord finder.
    pub fn chord_finder(&self) -> Option<&ChordFinder> {
        self.field_manager.chord_finder()
    }

    /// Relative accuracy bounds.
    pub fn propagator_settings(&self) -> &PropagatorSettings {
        &self.propagator
    }
}

impl std::fmt::Debug for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("config", &self.config)
            .field("equation", &self.equation.name())
            .field("field_manager", &self.field_manager)
            .field("propagator", &self.propagator)
            .finish()
    }
}
