//! Test utilities and mock types for superpose development.
//!
//! Provides mock implementations of the capability traits
//! ([`FieldSource`], [`FieldEvaluator`]) plus the standard fixtures in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use superpose_core::{BoundingBox, FieldEvaluator, FieldSource, FieldVector, Point};

/// A named source adding a constant vector inside a box.
pub struct ConstSource {
    pub name: String,
    pub bounds: BoundingBox,
    pub value: FieldVector,
}

impl ConstSource {
    pub fn new(name: impl Into<String>, bounds: BoundingBox, value: FieldVector) -> Self {
        Self {
            name: name.into(),
            bounds,
            value,
        }
    }
}

impl FieldSource for ConstSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains_point(&self, point: &Point) -> bool {
        self.bounds.contains(point)
    }

    fn add_contribution(&self, _point: &Point, field: &mut FieldVector) {
        *field += self.value;
    }
}

/// Like [`ConstSource`], but counts how often its bounding test runs.
///
/// Grab the shared counter with [`counter`](CountingSource::counter)
/// before handing the source to a registry.
pub struct CountingSource {
    bounds: BoundingBox,
    value: FieldVector,
    calls: Arc<AtomicUsize>,
}

impl CountingSource {
    pub fn new(bounds: BoundingBox, value: FieldVector) -> Self {
        Self {
            bounds,
            value,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the `contains_point` call counter.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl FieldSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    fn contains_point(&self, point: &Point) -> bool {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.bounds.contains(point)
    }

    fn add_contribution(&self, _point: &Point, field: &mut FieldVector) {
        *field += self.value;
    }
}

/// An evaluator returning the same field everywhere.
///
/// Records the number of calls so stepper tests can check how many
/// field evaluations a step costs.
pub struct MockEvaluator {
    value: FieldVector,
    calls: usize,
}

impl MockEvaluator {
    pub fn new(value: FieldVector) -> Self {
        Self { value, calls: 0 }
    }

    /// A field-free evaluator.
    pub fn zero() -> Self {
        Self::new(FieldVector::ZERO)
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl FieldEvaluator for MockEvaluator {
    fn field_value(&mut self, _point: &Point) -> FieldVector {
        self.calls += 1;
        self.value
    }
}
