//! Field source registry and evaluation snapshot.
//!
//! [`FieldRegistry`] owns the registered [`FieldSource`](superpose_core::FieldSource)s
//! and evaluates their superposition. Evaluation runs against an immutable
//! [`Snapshot`] that is rebuilt lazily on the first read after a mutation,
//! so a burst of registrations costs one rebuild, not one per insertion.
//!
//! The [`sources`] module provides reference sources for common beamline
//! elements.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod registry;
pub mod snapshot;
pub mod sources;

pub use registry::{CacheState, FieldRegistry, RegistryStats};
pub use snapshot::Snapshot;
pub use sources::{Quadrupole, UniformField};
