//! Equations of motion and step algorithms.
//!
//! A [`Stepper`] advances a 12-component [`State`] through a field by one
//! step, using an [`EquationOfMotion`] for the right-hand side and any
//! [`FieldEvaluator`](superpose_core::FieldEvaluator) for the field. The
//! six algorithms are selected through the closed [`StepperKind`] enum and
//! constructed by [`build_stepper`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod equation;
pub mod state;
pub mod stepper;

pub use equation::{EquationOfMotion, LorentzEquation, C_LIGHT};
pub use state::{first_non_finite, momentum, position, state_from, State, STATE_WIDTH};
pub use stepper::{build_stepper, Stepper, StepperKind};
