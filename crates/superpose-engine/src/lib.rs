//! Integration configuration and the global field aggregator.
//!
//! [`GlobalField`] is the entry point: it owns the field registry and an
//! [`Integration`] built from an [`IntegrationConfig`], evaluates the
//! superposed field, and hands the transport side a [`Propagation`]
//! handle for chord-bounded stepping.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chord;
pub mod config;
pub mod global;
pub mod integration;
pub mod manager;

pub use chord::{ChordFinder, ChordStep, DEFAULT_DELTA_CHORD};
pub use config::{AccuracyParameters, ConfigError, IntegrationConfig};
pub use global::{GlobalField, Propagation};
pub use integration::Integration;
pub use manager::{FieldManager, PropagatorSettings, DELTA_INTERSECTION_RATIO};
