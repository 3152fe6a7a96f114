//! Core types and traits for superposed field evaluation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace: source
//! IDs, points and field vectors, bounding boxes, error types, and the
//! capability traits every field source and evaluator implements.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod traits;

pub use error::{BoundsError, StepperError, TrackError};
pub use field::{is_finite_point, BoundingBox, FieldVector, Point, FIELD_COMPONENTS};
pub use id::SourceId;
pub use traits::{FieldEvaluator, FieldSource};
