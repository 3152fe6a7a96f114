//! Reference field sources for common beamline elements.
//!
//! Each source carries an axis-aligned [`BoundingBox`]; outside it the
//! source contributes nothing and costs one box test per evaluation.

use superpose_core::{BoundingBox, FieldSource, FieldVector, Point};

/// A constant field filling an axis-aligned box.
///
/// Models dipole magnets and uniform electrostatic gaps in the hard-edge
/// approximation.
#[derive(Clone, Debug)]
pub struct UniformField {
    bounds: BoundingBox,
    value: FieldVector,
}

impl UniformField {
    /// Create a uniform field of `value` inside `bounds`.
    pub fn new(bounds: BoundingBox, value: FieldVector) -> Self {
        Self { bounds, value }
    }
}

impl FieldSource for UniformField {
    fn name(&self) -> &str {
        "UniformField"
    }

    #[inline]
    fn contains_point(&self, point: &Point) -> bool {
        self.bounds.contains(point)
    }

    #[inline]
    fn add_contribution(&self, _point: &Point, field: &mut FieldVector) {
        *field += self.value;
    }
}

/// A hard-edge magnetic quadrupole with its axis along `z`.
///
/// Inside the bounding box the field is linear in the transverse offset
/// from the magnet axis `(center_x, center_y)`:
///
/// ```text
/// Bx = g · (y - center_y)
/// By = g · (x - center_x)
/// Bz = 0
/// ```
///
/// A positive gradient focuses positive particles travelling along `+z`
/// in `x` and defocuses them in `y`.
#[derive(Clone, Debug)]
pub struct Quadrupole {
    bounds: BoundingBox,
    center_x: f64,
    center_y: f64,
    gradient: f64,
}

impl Quadrupole {
    /// Create a quadrupole of field gradient `gradient` (tesla per mm)
    /// centred on `(center_x, center_y)`.
    pub fn new(bounds: BoundingBox, center_x: f64, center_y: f64, gradient: f64) -> Self {
        Self {
            bounds,
            center_x,
            center_y,
            gradient,
        }
    }
}

impl FieldSource for Quadrupole {
    fn name(&self) -> &str {
        "Quadrupole"
    }

    #[inline]
    fn contains_point(&self, point: &Point) -> bool {
        self.bounds.contains(point)
    }

    #[inline]
    fn add_contribution(&self, point: &Point, field: &mut FieldVector) {
        let dx = point[0] - self.center_x;
        let dy = point[1] - self.center_y;
        field[0] += self.gradient * dy;
        field[1] += self.gradient * dx;
    }
}
