//! Capability traits for field sources and field evaluators.

use crate::field::{FieldVector, Point};

/// A spatially bounded contributor to the total field.
///
/// # Contract
///
/// - [`contains_point`](FieldSource::contains_point) is pure and cheap; it
///   is called for every registered source on every evaluation.
/// - [`add_contribution`](FieldSource::add_contribution) only ever *adds*
///   into `field`. It must not reset or overwrite what earlier sources
///   accumulated.
/// - Sources are stateless with respect to evaluation: `&self` only.
///
/// # Object safety
///
/// This trait is object-safe; registries store sources as
/// `Arc<dyn FieldSource>`.
///
/// # Examples
///
/// ```
/// use superpose_core::{FieldSource, FieldVector, Point};
///
/// struct Solenoid {
///     radius: f64,
///     bz: f64,
/// }
///
/// impl FieldSource for Solenoid {
///     fn contains_point(&self, p: &Point) -> bool {
///         p[0] * p[0] + p[1] * p[1] <= self.radius * self.radius
///     }
///
///     fn add_contribution(&self, _p: &Point, field: &mut FieldVector) {
///         field[2] += self.bz;
///     }
/// }
///
/// let s = Solenoid { radius: 5.0, bz: 1.5 };
/// let mut f = FieldVector::ZERO;
/// if s.contains_point(&[1.0, 1.0, 0.0]) {
///     s.add_contribution(&[1.0, 1.0, 0.0], &mut f);
/// }
/// assert_eq!(f.magnetic(), [0.0, 0.0, 1.5]);
/// ```
pub trait FieldSource: Send + Sync + 'static {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str {
        "field_source"
    }

    /// Returns `true` if `point` lies within this source's bounding region.
    fn contains_point(&self, point: &Point) -> bool;

    /// Add this source's field at `point` into `field`.
    fn add_contribution(&self, point: &Point, field: &mut FieldVector);
}

/// Something that can report the total field at a point.
///
/// Implemented by the field registry and by the aggregator. Steppers call
/// it once per stage, so implementations must not allocate on this path.
/// Takes `&mut self` so an evaluator may finish deferred bookkeeping
/// (such as a pending snapshot rebuild) before reading.
pub trait FieldEvaluator {
    /// The superposed field at `point`.
    fn field_value(&mut self, point: &Point) -> FieldVector;
}

impl<F: FieldEvaluator + ?Sized> FieldEvaluator for &mut F {
    fn field_value(&mut self, point: &Point) -> FieldVector {
        (**self).field_value(point)
    }
}
