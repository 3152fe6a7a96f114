//! The integration state vector.

use superpose_core::Point;

/// Number of components in a [`State`].
///
/// Fixed across every stepper kind: 3 position, 3 momentum, 6 auxiliary
/// (time and spin in the spin-tracking layout).
pub const STATE_WIDTH: usize = 12;

/// A trajectory state: `[x, y, z, px, py, pz, aux0..aux5]`.
///
/// Positions are in millimetres, momenta in MeV/c.
pub type State = [f64; STATE_WIDTH];

/// Build a state from position and momentum with zeroed auxiliary slots.
pub fn state_from(position: Point, momentum: [f64; 3]) -> State {
    let mut y = [0.0; STATE_WIDTH];
    y[..3].copy_from_slice(&position);
    y[3..6].copy_from_slice(&momentum);
    y
}

/// The position slots of `y`.
#[inline]
pub fn position(y: &State) -> Point {
    [y[0], y[1], y[2]]
}

/// The momentum slots of `y`.
#[inline]
pub fn momentum(y: &State) -> [f64; 3] {
    [y[3], y[4], y[5]]
}

/// Index of the first NaN or infinite component, if any.
pub fn first_non_finite(y: &State) -> Option<usize> {
    y.iter().position(|c| !c.is_finite())
}

/// `y + h · Σ wᵢ kᵢ`.
#[inline]
pub(crate) fn combine(y: &State, h: f64, terms: &[(f64, &State)]) -> State {
    let mut out = *y;
    for (i, slot) in out.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (w, k) in terms {
            acc += w * k[i];
        }
        *slot += h * acc;
    }
    out
}
