//! Points, field vectors, and axis-aligned bounding boxes.

use std::ops::{Add, AddAssign, Index, IndexMut};

use crate::error::BoundsError;

/// Number of scalar components in a [`FieldVector`].
pub const FIELD_COMPONENTS: usize = 6;

/// A position in space as `[x, y, z]`, in millimetres.
pub type Point = [f64; 3];

/// Returns `true` if every coordinate of `point` is finite.
#[inline]
pub fn is_finite_point(point: &Point) -> bool {
    point[0].is_finite() && point[1].is_finite() && point[2].is_finite()
}

/// A six-component field value.
///
/// Components `0..3` carry the magnetic field and `3..6` the electric
/// field, following the convention of the reference equation of motion.
/// Sources only ever add into a `FieldVector`; the registry starts every
/// evaluation from [`FieldVector::ZERO`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldVector(pub [f64; FIELD_COMPONENTS]);

impl FieldVector {
    /// The zero field.
    pub const ZERO: Self = Self([0.0; FIELD_COMPONENTS]);

    /// Build a field vector from its magnetic and electric parts.
    pub fn new(magnetic: [f64; 3], electric: [f64; 3]) -> Self {
        Self([
            magnetic[0],
            magnetic[1],
            magnetic[2],
            electric[0],
            electric[1],
            electric[2],
        ])
    }

    /// A purely magnetic field.
    pub fn magnetic_only(b: [f64; 3]) -> Self {
        Self::new(b, [0.0; 3])
    }

    /// A purely electric field.
    pub fn electric_only(e: [f64; 3]) -> Self {
        Self::new([0.0; 3], e)
    }

    /// Magnetic components `[bx, by, bz]`.
    pub fn magnetic(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Electric components `[ex, ey, ez]`.
    pub fn electric(&self) -> [f64; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    /// Returns `true` if every component is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&c| c == 0.0)
    }
}

impl AddAssign for FieldVector {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl Add for FieldVector {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl Index<usize> for FieldVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for FieldVector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl From<[f64; FIELD_COMPONENTS]> for FieldVector {
    fn from(v: [f64; FIELD_COMPONENTS]) -> Self {
        Self(v)
    }
}

/// An inclusive axis-aligned box used as a source's bounding region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    min: Point,
    max: Point,
}

impl BoundingBox {
    /// Create a box from its minimum and maximum corners.
    ///
    /// Both corners must be finite and `min[i] <= max[i]` on every axis.
    /// A degenerate (zero-thickness) box is allowed.
    pub fn new(min: Point, max: Point) -> Result<Self, BoundsError> {
        if !is_finite_point(&min) || !is_finite_point(&max) {
            return Err(BoundsError::NonFinite { min, max });
        }
        for axis in 0..3 {
            if min[axis] > max[axis] {
                return Err(BoundsError::Inverted {
                    axis,
                    min: min[axis],
                    max: max[axis],
                });
            }
        }
        Ok(Self { min, max })
    }

    /// The cube `[lo, hi]³`.
    pub fn cube(lo: f64, hi: f64) -> Result<Self, BoundsError> {
        Self::new([lo; 3], [hi; 3])
    }

    /// Minimum corner.
    pub fn min(&self) -> Point {
        self.min
    }

    /// Maximum corner.
    pub fn max(&self) -> Point {
        self.max
    }

    /// Returns `true` if `point` lies inside the box or on its surface.
    ///
    /// A non-finite coordinate never compares inside.
    #[inline]
    pub fn contains(&self, point: &Point) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
            && point[2] >= self.min[2]
            && point[2] <= self.max[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_vector_is_zero() {
        assert!(FieldVector::ZERO.is_zero());
        assert_eq!(FieldVector::default(), FieldVector::ZERO);
    }

    #[test]
    fn magnetic_and_electric_split() {
        let f = FieldVector::new([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
        assert_eq!(f.magnetic(), [1.0, 2.0, 3.0]);
        assert_eq!(f.electric(), [4.0, 5.0, 6.0]);
        assert_eq!(f[4], 5.0);
    }

    #[test]
    fn box_contains_is_inclusive() {
        let b = BoundingBox::cube(0.0, 10.0).unwrap();
        assert!(b.contains(&[0.0, 0.0, 0.0]));
        assert!(b.contains(&[10.0, 10.0, 10.0]));
        assert!(b.contains(&[5.0, 2.0, 9.0]));
        assert!(!b.contains(&[10.000_001, 5.0, 5.0]));
        assert!(!b.contains(&[5.0, -0.1, 5.0]));
    }

    #[test]
    fn nan_point_is_never_inside() {
        let b = BoundingBox::cube(-1e9, 1e9).unwrap();
        assert!(!b.contains(&[f64::NAN, 0.0, 0.0]));
        assert!(!b.contains(&[0.0, 0.0, f64::NAN]));
    }

    #[test]
    fn inverted_box_rejected() {
        match BoundingBox::new([0.0, 5.0, 0.0], [1.0, 4.0, 1.0]) {
            Err(BoundsError::Inverted { axis: 1, .. }) => {}
            other => panic!("expected Inverted on axis 1, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_box_rejected() {
        match BoundingBox::new([0.0; 3], [f64::INFINITY, 1.0, 1.0]) {
            Err(BoundsError::NonFinite { .. }) => {}
            other => panic!("expected NonFinite, got {other:?}"),
        }
    }

    #[test]
    fn finite_point_check() {
        assert!(is_finite_point(&[1.0, 2.0, 3.0]));
        assert!(!is_finite_point(&[f64::NAN, 0.0, 0.0]));
        assert!(!is_finite_point(&[0.0, f64::NEG_INFINITY, 0.0]));
    }

    fn arb_vector() -> impl Strategy<Value = FieldVector> {
        prop::array::uniform6(-1e3f64..1e3).prop_map(FieldVector)
    }

    proptest! {
        #[test]
        fn addition_commutative(a in arb_vector(), b in arb_vector()) {
            prop_assert_eq!(a + b, b + a);
        }

        #[test]
        fn zero_is_identity(a in arb_vector()) {
            prop_assert_eq!(a + FieldVector::ZERO, a);
        }

        #[test]
        fn box_contains_its_corners(
            lo in prop::array::uniform3(-100.0f64..0.0),
            hi in prop::array::uniform3(0.0f64..100.0),
        ) {
            let b = BoundingBox::new(lo, hi).unwrap();
            prop_assert!(b.contains(&lo));
            prop_assert!(b.contains(&hi));
        }
    }
}
