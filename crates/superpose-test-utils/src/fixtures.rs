//! Reusable source layouts.
//!
//! - [`two_overlapping_boxes`]: the canonical two-source overlap layout.
//! - [`box_row`]: `n` unit boxes laid end to end along `z`.

use superpose_core::{BoundingBox, FieldVector};

use crate::ConstSource;

/// Source A fills `[0,10]³` with `(1,0,0,0,0,0)`; source B fills
/// `[5,15]³` with `(0,2,0,0,0,0)`.
///
/// Expected field: `(1,0,0,…)` at `(2,2,2)`, `(1,2,0,…)` at `(7,7,7)`,
/// zero at `(20,20,20)`.
pub fn two_overlapping_boxes() -> (ConstSource, ConstSource) {
    let a = ConstSource::new(
        "A",
        BoundingBox::cube(0.0, 10.0).expect("valid cube"),
        FieldVector([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    );
    let b = ConstSource::new(
        "B",
        BoundingBox::cube(5.0, 15.0).expect("valid cube"),
        FieldVector([0.0, 2.0, 0.0, 0.0, 0.0, 0.0]),
    );
    (a, b)
}

/// `n` boxes `[-1,1]² × [i, i+1]` each contributing `value`.
///
/// Neighbouring boxes share a face, so a point exactly on `z = i` sees
/// two contributions.
pub fn box_row(n: usize, value: FieldVector) -> Vec<ConstSource> {
    (0..n)
        .map(|i| {
            let z = i as f64;
            ConstSource::new(
                format!("row{i}"),
                BoundingBox::new([-1.0, -1.0, z], [1.0, 1.0, z + 1.0]).expect("valid box"),
                value,
            )
        })
        .collect()
}
