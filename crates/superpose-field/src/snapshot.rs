//! Immutable, read-optimized view of the registered sources.

use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use superpose_core::{is_finite_point, FieldSource, FieldVector, Point, SourceId};

/// A flat, immutable copy of the registry's sources in registration order.
///
/// Built by [`FieldRegistry`](crate::FieldRegistry) when its cache is
/// dirty. The scan in [`evaluate`](Snapshot::evaluate) touches every entry
/// exactly once and performs no allocation.
pub struct Snapshot {
    entries: Box<[(SourceId, Arc<dyn FieldSource>)]>,
    generation: u64,
}

impl Snapshot {
    pub(crate) fn build(
        sources: &IndexMap<SourceId, Arc<dyn FieldSource>>,
        generation: u64,
    ) -> Self {
        let entries = sources
            .iter()
            .map(|(&id, source)| (id, Arc::clone(source)))
            .collect();
        Self {
            entries,
            generation,
        }
    }

    /// Number of sources captured.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot captured zero sources.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build counter of the registry at the time this snapshot was taken.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Source IDs in scan order.
    pub fn ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Superposed field at `point`.
    ///
    /// Returns [`FieldVector::ZERO`] for a non-finite point. Every source
    /// is tested; overlapping sources all contribute.
    #[inline]
    pub fn evaluate(&self, point: &Point) -> FieldVector {
        let mut field = FieldVector::ZERO;
        if !is_finite_point(point) {
            return field;
        }
        for (_, source) in self.entries.iter() {
            if source.contains_point(point) {
                source.add_contribution(point, &mut field);
            }
        }
        field
    }

    /// IDs of the sources whose bounding region contains `point`.
    pub fn contributors(&self, point: &Point) -> SmallVec<[SourceId; 8]> {
        if !is_finite_point(point) {
            return SmallVec::new();
        }
        self.entries
            .iter()
            .filter(|(_, source)| source.contains_point(point))
            .map(|(id, _)| *id)
            .collect()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("sources", &self.entries.len())
            .field("generation", &self.generation)
            .finish()
    }
}
