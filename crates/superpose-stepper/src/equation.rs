//! Equations of motion: the right-hand side the steppers integrate.

use superpose_core::{FieldEvaluator, FieldVector};

use crate::state::{position, State};

/// `c` in MeV/c per tesla per millimetre: the curvature coefficient that
/// turns `p̂ × B` (tesla) into a momentum change per unit path length.
pub const C_LIGHT: f64 = 0.299_792_458;

/// Derivatives of the state with respect to path length.
///
/// Implementations receive the field already evaluated at the state's
/// position; [`right_hand_side`](EquationOfMotion::right_hand_side) does
/// the lookup and is what steppers call per stage.
pub trait EquationOfMotion: Send + Sync + 'static {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str {
        "equation"
    }

    /// Write `dy/ds` at `y` under `field` into `dydx`.
    fn derivatives(&self, field: &FieldVector, y: &State, dydx: &mut State);

    /// Evaluate the field at the position of `y`, then the derivatives.
    #[inline]
    fn right_hand_side(&self, fields: &mut dyn FieldEvaluator, y: &State, dydx: &mut State) {
        let field = fields.field_value(&position(y));
        self.derivatives(&field, y, dydx);
    }
}

/// Lorentz force on a charged particle, parametrised by path length.
///
/// With `p̂ = p/|p|` and `E_tot = √(|p|² + m²)`:
///
/// ```text
/// dx/ds = p̂
/// dp/ds = q · (E · E_tot/|p| + C_LIGHT · p̂ × B)
/// ```
///
/// `B` in tesla, `E` in MV/mm, momentum and mass in MeV. The auxiliary
/// slots `6..12` are carried through with zero derivative; a spin
/// equation replaces this type when precession matters.
#[derive(Clone, Debug, PartialEq)]
pub struct LorentzEquation {
    charge: f64,
    mass: f64,
}

impl LorentzEquation {
    /// Proton rest mass in MeV.
    pub const PROTON_MASS: f64 = 938.272_088_16;

    /// Create an equation for a particle of `charge` (units of `e`) and
    /// rest `mass` (MeV).
    pub fn new(charge: f64, mass: f64) -> Self {
        Self { charge, mass }
    }

    /// A unit positive charge with the proton mass.
    pub fn proton() -> Self {
        Self::new(1.0, Self::PROTON_MASS)
    }

    /// Charge in units of `e`.
    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// Rest mass in MeV.
    pub fn mass(&self) -> f64 {
        self.mass
    }
}

impl Default for LorentzEquation {
    fn default() -> Self {
        Self::proton()
    }
}

impl EquationOfMotion for LorentzEquation {
    fn name(&self) -> &str {
        "LorentzEquation"
    }

    fn derivatives(&self, field: &FieldVector, y: &State, dydx: &mut State) {
        *dydx = [0.0; crate::STATE_WIDTH];
        let p = [y[3], y[4], y[5]];
        let p_mag = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
        if p_mag == 0.0 {
            return;
        }
        let inv_p = 1.0 / p_mag;
        let u = [p[0] * inv_p, p[1] * inv_p, p[2] * inv_p];
        let [bx, by, bz] = field.magnetic();
        let e = field.electric();
        let energy_over_p = (p_mag * p_mag + self.mass * self.mass).sqrt() * inv_p;
        let cof = self.charge * C_LIGHT;

        dydx[0] = u[0];
        dydx[1] = u[1];
        dydx[2] = u[2];
        dydx[3] = cof * (u[1] * bz - u[2] * by) + self.charge * e[0] * energy_over_p;
        dydx[4] = cof * (u[2] * bx - u[0] * bz) + self.charge * e[1] * energy_over_p;
        dydx[5] = cof * (u[0] * by - u[1] * bx) + self.charge * e[2] * energy_over_p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::state_from;
    use approx::assert_relative_eq;

    #[test]
    fn field_free_motion_is_straight() {
        let eq = LorentzEquation::proton();
        let y = state_from([0.0; 3], [3.0, 0.0, 4.0]);
        let mut dydx = [9.0; crate::STATE_WIDTH];
        eq.derivatives(&FieldVector::ZERO, &y, &mut dydx);
        assert_relative_eq!(dydx[0], 0.6);
        assert_relative_eq!(dydx[2], 0.8);
        assert!(dydx[3..].iter().all(|&c| c == 0.0));
    }

    #[test]
    fn magnetic_force_is_perpendicular() {
        let eq = LorentzEquation::proton();
        let y = state_from([0.0; 3], [100.0, 0.0, 0.0]);
        let mut dydx = [0.0; crate::STATE_WIDTH];
        eq.derivatives(&FieldVector::magnetic_only([0.0, 0.0, 1.0]), &y, &mut dydx);
        // x̂ × ẑ = -ŷ
        assert_eq!(dydx[3], 0.0);
        assert_relative_eq!(dydx[4], -C_LIGHT);
        assert_eq!(dydx[5], 0.0);
    }

    #[test]
    fn negative_charge_bends_the_other_way() {
        let eq = LorentzEquation::new(-1.0, 0.511);
        let y = state_from([0.0; 3], [100.0, 0.0, 0.0]);
        let mut dydx = [0.0; crate::STATE_WIDTH];
        eq.derivatives(&FieldVector::magnetic_only([0.0, 0.0, 1.0]), &y, &mut dydx);
        assert_relative_eq!(dydx[4], C_LIGHT);
    }

    #[test]
    fn electric_field_accelerates_along_e() {
        let eq = LorentzEquation::new(1.0, 0.0);
        let y = state_from([0.0; 3], [0.0, 0.0, 10.0]);
        let mut dydx = [0.0; crate::STATE_WIDTH];
        eq.derivatives(&FieldVector::electric_only([0.0, 0.0, 2.0]), &y, &mut dydx);
        // Massless: E_tot/|p| = 1.
        assert_relative_eq!(dydx[5], 2.0);
    }

    #[test]
    fn zero_momentum_has_zero_derivative() {
        let eq = LorentzEquation::proton();
        let y = state_from([1.0, 2.0, 3.0], [0.0; 3]);
        let mut dydx = [1.0; crate::STATE_WIDTH];
        eq.derivatives(&FieldVector::magnetic_only([1.0, 1.0, 1.0]), &y, &mut dydx);
        assert!(dydx.iter().all(|&c| c == 0.0));
    }
}
