//! The field source registry and its lazily rebuilt snapshot cache.
//!
//! # Cache states
//!
//! The registry is always in one of two states:
//!
//! - **Dirty**: the canonical collection changed since the last build
//!   (or nothing was ever built). No snapshot is held.
//! - **Ready**: a [`Snapshot`] exactly mirroring the canonical collection,
//!   in the same order, is installed.
//!
//! Every mutation moves the registry to Dirty. [`FieldRegistry::evaluate`]
//! and [`FieldRegistry::commit`] move it to Ready by building a new
//! snapshot. Since both take `&mut self`, a snapshot can never be observed
//! half-built and registration can never race with evaluation.

use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use smallvec::SmallVec;
use superpose_core::{is_finite_point, FieldEvaluator, FieldSource, FieldVector, Point, SourceId};

use crate::snapshot::Snapshot;

/// Observable cache state of a [`FieldRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// The next read rebuilds the snapshot.
    Dirty,
    /// A snapshot matching the canonical collection is installed.
    Ready,
}

/// Counters maintained by a [`FieldRegistry`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Generation of the most recent snapshot, which is also the number of
    /// rebuilds performed. Zero before the first build.
    pub generation: u64,
    /// Number of evaluations short-circuited because the point was non-finite.
    pub rejected_points: u64,
}

/// Owns the registered field sources and evaluates their superposition.
///
/// # Example
///
/// ```
/// use superpose_core::{BoundingBox, FieldVector};
/// use superpose_field::{FieldRegistry, UniformField};
///
/// let mut registry = FieldRegistry::new();
/// registry.register(UniformField::new(
///     BoundingBox::cube(0.0, 10.0).unwrap(),
///     FieldVector::magnetic_only([1.0, 0.0, 0.0]),
/// ));
///
/// assert_eq!(registry.evaluate(&[2.0, 2.0, 2.0]).magnetic(), [1.0, 0.0, 0.0]);
/// assert!(registry.evaluate(&[20.0, 0.0, 0.0]).is_zero());
/// ```
#[derive(Default)]
pub struct FieldRegistry {
    sources: IndexMap<SourceId, Arc<dyn FieldSource>>,
    /// `None` while dirty.
    snapshot: Option<Snapshot>,
    next_id: u64,
    stats: RegistryStats,
}

impl FieldRegistry {
    /// Create an empty, dirty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `source` and append it to the collection.
    ///
    /// Only bookkeeping happens here; the snapshot is rebuilt on the next
    /// read.
    pub fn register<S: FieldSource>(&mut self, source: S) -> SourceId {
        self.insert(Arc::new(source))
    }

    /// Like [`register`](Self::register), for an already boxed source.
    pub fn register_boxed(&mut self, source: Box<dyn FieldSource>) -> SourceId {
        self.insert(Arc::from(source))
    }

    fn insert(&mut self, source: Arc<dyn FieldSource>) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        self.sources.insert(id, source);
        self.snapshot = None;
        id
    }

    /// Remove a single source, preserving the order of the rest.
    ///
    /// Returns `false` if `id` is not registered.
    pub fn remove(&mut self, id: SourceId) -> bool {
        if self.sources.shift_remove(&id).is_none() {
            return false;
        }
        self.snapshot = None;
        true
    }

    /// Drop every registered source and discard the snapshot.
    ///
    /// Safe on an empty registry; the cache is reset to dirty regardless.
    pub fn clear(&mut self) {
        self.sources.clear();
        self.snapshot = None;
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Look up a registered source.
    pub fn get(&self, id: SourceId) -> Option<&dyn FieldSource> {
        self.sources.get(&id).map(|s| &**s)
    }

    /// Registered IDs in registration order.
    pub fn ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.sources.keys().copied()
    }

    /// Current cache state.
    pub fn cache_state(&self) -> CacheState {
        if self.snapshot.is_some() {
            CacheState::Ready
        } else {
            CacheState::Dirty
        }
    }

    /// Whether the next read will rebuild the snapshot.
    pub fn is_dirty(&self) -> bool {
        self.snapshot.is_none()
    }

    /// The installed snapshot, if the cache is ready.
    ///
    /// Lets holders of a shared reference evaluate after an explicit
    /// [`commit`](Self::commit).
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Snapshot generation and rejected probe point counters.
    pub fn stats(&self) -> RegistryStats {
        self.stats
    }

    /// Build the snapshot now if the cache is dirty, and return it.
    ///
    /// A no-op when the cache is already ready.
    pub fn commit(&mut self) -> &Snapshot {
        let sources = &self.sources;
        let stats = &mut self.stats;
        self.snapshot.get_or_insert_with(|| {
            stats.generation += 1;
            debug!(
                "rebuilding field snapshot: {} sources, generation {}",
                sources.len(),
                stats.generation
            );
            Snapshot::build(sources, stats.generation)
        })
    }

    /// Superposed field at `point`.
    ///
    /// A non-finite coordinate yields [`FieldVector::ZERO`]; upstream
    /// tracking code is known to probe with such points occasionally and
    /// this is not treated as an error. Otherwise rebuilds the snapshot if
    /// dirty, then sums the contributions of every source whose bounding
    /// region contains the point.
    #[inline]
    pub fn evaluate(&mut self, point: &Point) -> FieldVector {
        if !is_finite_point(point) {
            self.stats.rejected_points += 1;
            return FieldVector::ZERO;
        }
        self.commit().evaluate(point)
    }

    /// IDs of the sources contributing at `point`, in scan order.
    pub fn contributors(&mut self, point: &Point) -> SmallVec<[SourceId; 8]> {
        self.commit().contributors(point)
    }
}

impl FieldEvaluator for FieldRegistry {
    #[inline]
    fn field_value(&mut self, point: &Point) -> FieldVector {
        self.evaluate(point)
    }
}

impl std::fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("sources", &self.sources.len())
            .field("cache", &self.cache_state())
            .field("stats", &self.stats)
            .finish()
    }
}
