//! Superpose: composite electromagnetic field evaluation for particle
//! tracking.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all superpose sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use superpose::prelude::*;
//!
//! // A solenoid-like source: uniform Bz inside a cylinder.
//! struct Solenoid {
//!     radius: f64,
//!     length: f64,
//!     bz: f64,
//! }
//!
//! impl FieldSource for Solenoid {
//!     fn name(&self) -> &str { "solenoid" }
//!     fn contains_point(&self, p: &Point) -> bool {
//!         p[0] * p[0] + p[1] * p[1] <= self.radius * self.radius
//!             && (0.0..=self.length).contains(&p[2])
//!     }
//!     fn add_contribution(&self, _p: &Point, field: &mut FieldVector) {
//!         field[2] += self.bz;
//!     }
//! }
//!
//! let mut field = GlobalField::new();
//! field.add_source(Solenoid { radius: 100.0, length: 1000.0, bz: 2.0 });
//! assert_eq!(field.evaluate(&[0.0, 0.0, 500.0]).magnetic(), [0.0, 0.0, 2.0]);
//!
//! let y = state_from([10.0, 0.0, 0.0], [0.0, 50.0, 100.0]);
//! let chord = field.propagation().find_next_chord(&y, 50.0).unwrap();
//! assert!(chord.chord_deviation <= 3.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `superpose-core` | Points, field vectors, bounding boxes, core traits, errors |
//! | [`field`] | `superpose-field` | Field registry, snapshot, reference sources |
//! | [`stepper`] | `superpose-stepper` | State vector, equations of motion, step algorithms |
//! | [`engine`] | `superpose-engine` | Accuracy configuration, chord finder, global field |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`superpose-core`).
///
/// Contains [`types::FieldVector`], [`types::BoundingBox`], the
/// [`types::FieldSource`] and [`types::FieldEvaluator`] traits, and the
/// error enums.
pub use superpose_core as types;

/// Field registry and reference sources (`superpose-field`).
pub use superpose_field as field;

/// Equations of motion and step algorithms (`superpose-stepper`).
///
/// [`stepper::build_stepper`] turns a [`stepper::StepperKind`] into a
/// boxed [`stepper::Stepper`].
pub use superpose_stepper as stepper;

/// Integration configuration and the aggregate field (`superpose-engine`).
pub use superpose_engine as engine;

/// Common imports for typical superpose usage.
///
/// ```rust
/// use superpose::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use superpose_core::{
        BoundingBox, FieldEvaluator, FieldSource, FieldVector, Point, SourceId,
    };

    // Errors
    pub use superpose_core::{BoundsError, StepperError, TrackError};
    pub use superpose_engine::ConfigError;

    // Sources
    pub use superpose_field::{FieldRegistry, Quadrupole, UniformField};

    // Stepping
    pub use superpose_stepper::{
        state_from, EquationOfMotion, LorentzEquation, State, StepperKind, STATE_WIDTH,
    };

    // Engine
    pub use superpose_engine::{
        AccuracyParameters, ChordStep, GlobalField, IntegrationConfig, Propagation,
    };
}
