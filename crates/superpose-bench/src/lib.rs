//! Benchmark profiles for superposed field evaluation.
//!
//! - [`reference_profile`]: 64 sources along a 6.4 m beamline
//! - [`stress_profile`]: 1024 sources, mostly disjoint
//! - [`probe_points`]: deterministic probe positions via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use superpose_core::{BoundingBox, FieldVector, Point};
use superpose_engine::GlobalField;
use superpose_field::{Quadrupole, UniformField};

/// Length of one lattice cell along `z`, in millimetres.
pub const CELL_LENGTH: f64 = 100.0;

/// Half-aperture of every element, in millimetres.
pub const APERTURE: f64 = 50.0;

/// Build a field of `cells` alternating dipole and quadrupole elements.
///
/// Element `i` spans `z ∈ [i·CELL_LENGTH, (i+1)·CELL_LENGTH]`, so a probe
/// point sees at most two sources (on a shared face).
pub fn beamline(cells: usize) -> GlobalField {
    let mut field = GlobalField::new();
    for i in 0..cells {
        let z0 = i as f64 * CELL_LENGTH;
        let bounds = BoundingBox::new(
            [-APERTURE, -APERTURE, z0],
            [APERTURE, APERTURE, z0 + CELL_LENGTH],
        )
        .expect("lattice cell bounds are ordered");
        if i % 2 == 0 {
            field.add_source(UniformField::new(
                bounds,
                FieldVector::magnetic_only([0.0, 0.3, 0.0]),
            ));
        } else {
            let sign = if i % 4 == 1 { 1.0 } else { -1.0 };
            field.add_source(Quadrupole::new(bounds, 0.0, 0.0, sign * 0.002));
        }
    }
    field
}

/// 64 lattice cells.
pub fn reference_profile() -> GlobalField {
    beamline(64)
}

/// 1024 lattice cells.
pub fn stress_profile() -> GlobalField {
    beamline(1024)
}

/// Generate `n` deterministic probe points inside the first `cells`
/// lattice cells.
///
/// Uses the same LCG-style mixing as the seeded placement helpers, so the
/// set depends only on `seed`.
pub fn probe_points(n: usize, cells: usize, seed: u64) -> Vec<Point> {
    let length = cells as f64 * CELL_LENGTH;
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..n)
        .map(|_| {
            let x = (next() * 2.0 - 1.0) * APERTURE;
            let y = (next() * 2.0 - 1.0) * APERTURE;
            let z = next() * length;
            [x, y, z]
        })
        .collect()
}
