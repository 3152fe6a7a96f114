//! Step algorithms and their selection.
//!
//! Every stepper advances a [`State`] by one step of length `h` and writes
//! an error estimate alongside the result. Cash-Karp carries an embedded
//! fourth-order solution for that estimate; the single-formula methods
//! estimate it by step doubling (two half steps against one full step),
//! and return the two-half-step result.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::info;
use superpose_core::{FieldEvaluator, StepperError};

use crate::equation::EquationOfMotion;
use crate::state::{combine, State, STATE_WIDTH};

/// The interchangeable step algorithms.
///
/// The raw identifiers `0..=5` follow the historical numbering used in
/// configuration files: see [`StepperKind::id`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StepperKind {
    /// First-order forward Euler.
    ExplicitEuler,
    /// Second-order trapezoidal predictor-corrector.
    ImplicitEuler,
    /// Second-order midpoint rule.
    SimpleRunge,
    /// Third-order Heun scheme.
    SimpleHeum,
    /// Classical fourth-order Runge-Kutta.
    #[default]
    ClassicalRk4,
    /// Fifth-order Cash-Karp with embedded fourth-order error estimate.
    CashKarpRkf45,
}

impl StepperKind {
    /// Every kind in identifier order.
    pub const ALL: [StepperKind; 6] = [
        StepperKind::ExplicitEuler,
        StepperKind::ImplicitEuler,
        StepperKind::SimpleRunge,
        StepperKind::SimpleHeum,
        StepperKind::ClassicalRk4,
        StepperKind::CashKarpRkf45,
    ];

    /// The raw identifier of this kind.
    pub fn id(self) -> u32 {
        match self {
            Self::ExplicitEuler => 0,
            Self::ImplicitEuler => 1,
            Self::SimpleRunge => 2,
            Self::SimpleHeum => 3,
            Self::ClassicalRk4 => 4,
            Self::CashKarpRkf45 => 5,
        }
    }

    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::ExplicitEuler => "ExplicitEuler",
            Self::ImplicitEuler => "ImplicitEuler",
            Self::SimpleRunge => "SimpleRunge",
            Self::SimpleHeum => "SimpleHeum",
            Self::ClassicalRk4 => "ClassicalRK4",
            Self::CashKarpRkf45 => "CashKarpRKF45",
        }
    }

    /// Order of accuracy of the underlying formula.
    pub fn order(self) -> u32 {
        match self {
            Self::ExplicitEuler => 1,
            Self::ImplicitEuler | Self::SimpleRunge => 2,
            Self::SimpleHeum => 3,
            Self::ClassicalRk4 | Self::CashKarpRkf45 => 4,
        }
    }
}

impl fmt::Display for StepperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for StepperKind {
    type Error = StepperError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(raw as usize)
            .copied()
            .ok_or(StepperError::UnknownKind { raw })
    }
}

impl FromStr for StepperKind {
    type Err = StepperError;

    /// Case-insensitive; underscores and dashes are ignored, so
    /// `"classical_rk4"` and `"ClassicalRK4"` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|k| k.name().to_ascii_lowercase() == key)
            .ok_or_else(|| StepperError::UnknownName { name: s.to_string() })
    }
}

/// A configured step algorithm bound to an equation of motion.
///
/// # Object safety
///
/// This trait is object-safe; the engine stores steppers as
/// `Box<dyn Stepper>`.
pub trait Stepper: Send + Sync {
    /// Which algorithm this is.
    fn kind(&self) -> StepperKind;

    /// The equation this stepper integrates.
    fn equation(&self) -> &dyn EquationOfMotion;

    /// Number of state components integrated. Always [`STATE_WIDTH`].
    fn state_width(&self) -> usize {
        STATE_WIDTH
    }

    /// Order of accuracy.
    fn order(&self) -> u32 {
        self.kind().order()
    }

    /// `dy/ds` at `y`.
    fn derivatives(&self, fields: &mut dyn FieldEvaluator, y: &State, dydx: &mut State) {
        self.equation().right_hand_side(fields, y, dydx);
    }

    /// Advance `y` by `h`, given `dydx` evaluated at `y`.
    ///
    /// Writes the new state to `y_out` and a per-component error estimate
    /// to `y_err`.
    fn step(
        &self,
        fields: &mut dyn FieldEvaluator,
        y: &State,
        dydx: &State,
        h: f64,
        y_out: &mut State,
        y_err: &mut State,
    );
}

/// A single explicit step formula: `y_out = rule(y, dydx, h)`.
type StepRule = fn(&dyn EquationOfMotion, &mut dyn FieldEvaluator, &State, &State, f64) -> State;

/// Wraps a single-formula method and estimates its error by doubling.
struct DoublingStepper {
    kind: StepperKind,
    rule: StepRule,
    equation: Arc<dyn EquationOfMotion>,
}

impl Stepper for DoublingStepper {
    fn kind(&self) -> StepperKind {
        self.kind
    }

    fn equation(&self) -> &dyn EquationOfMotion {
        &*self.equation
    }

    fn step(
        &self,
        fields: &mut dyn FieldEvaluator,
        y: &State,
        dydx: &State,
        h: f64,
        y_out: &mut State,
        y_err: &mut State,
    ) {
        let eq = &*self.equation;
        let half = 0.5 * h;

        let y_mid = (self.rule)(eq, fields, y, dydx, half);
        let mut dydx_mid = [0.0; STATE_WIDTH];
        eq.right_hand_side(fields, &y_mid, &mut dydx_mid);
        *y_out = (self.rule)(eq, fields, &y_mid, &dydx_mid, half);

        let y_full = (self.rule)(eq, fields, y, dydx, h);
        for i in 0..STATE_WIDTH {
            y_err[i] = y_out[i] - y_full[i];
        }
    }
}

fn explicit_euler(
    _eq: &dyn EquationOfMotion,
    _fields: &mut dyn FieldEvaluator,
    y: &State,
    dydx: &State,
    h: f64,
) -> State {
    combine(y, h, &[(1.0, dydx)])
}

fn implicit_euler(
    eq: &dyn EquationOfMotion,
    fields: &mut dyn FieldEvaluator,
    y: &State,
    dydx: &State,
    h: f64,
) -> State {
    let y_pred = combine(y, h, &[(1.0, dydx)]);
    let mut k2 = [0.0; STATE_WIDTH];
    eq.right_hand_side(fields, &y_pred, &mut k2);
    combine(y, h, &[(0.5, dydx), (0.5, &k2)])
}

fn simple_runge(
    eq: &dyn EquationOfMotion,
    fields: &mut dyn FieldEvaluator,
    y: &State,
    dydx: &State,
    h: f64,
) -> State {
    let y_mid = combine(y, h, &[(0.5, dydx)]);
    let mut k2 = [0.0; STATE_WIDTH];
    eq.right_hand_side(fields, &y_mid, &mut k2);
    combine(y, h, &[(1.0, &k2)])
}

fn simple_heum(
    eq: &dyn EquationOfMotion,
    fields: &mut dyn FieldEvaluator,
    y: &State,
    dydx: &State,
    h: f64,
) -> State {
    let y2 = combine(y, h, &[(1.0 / 3.0, dydx)]);
    let mut k2 = [0.0; STATE_WIDTH];
    eq.right_hand_side(fields, &y2, &mut k2);
    let y3 = combine(y, h, &[(2.0 / 3.0, &k2)]);
    let mut k3 = [0.0; STATE_WIDTH];
    eq.right_hand_side(fields, &y3, &mut k3);
    combine(y, h, &[(0.25, dydx), (0.75, &k3)])
}

fn classical_rk4(
    eq: &dyn EquationOfMotion,
    fields: &mut dyn FieldEvaluator,
    y: &State,
    dydx: &State,
    h: f64,
) -> State {
    let mut k2 = [0.0; STATE_WIDTH];
    let mut k3 = [0.0; STATE_WIDTH];
    let mut k4 = [0.0; STATE_WIDTH];
    eq.right_hand_side(fields, &combine(y, h, &[(0.5, dydx)]), &mut k2);
    eq.right_hand_side(fields, &combine(y, h, &[(0.5, &k2)]), &mut k3);
    eq.right_hand_side(fields, &combine(y, h, &[(1.0, &k3)]), &mut k4);
    combine(
        y,
        h,
        &[(1.0 / 6.0, dydx), (1.0 / 3.0, &k2), (1.0 / 3.0, &k3), (1.0 / 6.0, &k4)],
    )
}

/// Cash-Karp embedded Runge-Kutta pair.
struct CashKarp {
    equation: Arc<dyn EquationOfMotion>,
}

// Butcher tableau.
const B21: f64 = 0.2;
const B31: f64 = 3.0 / 40.0;
const B32: f64 = 9.0 / 40.0;
const B41: f64 = 0.3;
const B42: f64 = -0.9;
const B43: f64 = 1.2;
const B51: f64 = -11.0 / 54.0;
const B52: f64 = 2.5;
const B53: f64 = -70.0 / 27.0;
const B54: f64 = 35.0 / 27.0;
const B61: f64 = 1631.0 / 55296.0;
const B62: f64 = 175.0 / 512.0;
const B63: f64 = 575.0 / 13824.0;
const B64: f64 = 44275.0 / 110592.0;
const B65: f64 = 253.0 / 4096.0;
const C1: f64 = 37.0 / 378.0;
const C3: f64 = 250.0 / 621.0;
const C4: f64 = 125.0 / 594.0;
const C6: f64 = 512.0 / 1771.0;
const DC1: f64 = C1 - 2825.0 / 27648.0;
const DC3: f64 = C3 - 18575.0 / 48384.0;
const DC4: f64 = C4 - 13525.0 / 55296.0;
const DC5: f64 = -277.0 / 14336.0;
const DC6: f64 = C6 - 0.25;

impl Stepper for CashKarp {
    fn kind(&self) -> StepperKind {
        StepperKind::CashKarpRkf45
    }

    fn equation(&self) -> &dyn EquationOfMotion {
        &*self.equation
    }

    fn step(
        &self,
        fields: &mut dyn FieldEvaluator,
        y: &State,
        dydx: &State,
        h: f64,
        y_out: &mut State,
        y_err: &mut State,
    ) {
        let eq = &*self.equation;
        let k1 = dydx;
        let mut k2 = [0.0; STATE_WIDTH];
        let mut k3 = [0.0; STATE_WIDTH];
        let mut k4 = [0.0; STATE_WIDTH];
        let mut k5 = [0.0; STATE_WIDTH];
        let mut k6 = [0.0; STATE_WIDTH];

        eq.right_hand_side(fields, &combine(y, h, &[(B21, k1)]), &mut k2);
        eq.right_hand_side(fields, &combine(y, h, &[(B31, k1), (B32, &k2)]), &mut k3);
        eq.right_hand_side(
            fields,
            &combine(y, h, &[(B41, k1), (B42, &k2), (B43, &k3)]),
            &mut k4,
        );
        eq.right_hand_side(
            fields,
            &combine(y, h, &[(B51, k1), (B52, &k2), (B53, &k3), (B54, &k4)]),
            &mut k5,
        );
        eq.right_hand_side(
            fields,
            &combine(
                y,
                h,
                &[(B61, k1), (B62, &k2), (B63, &k3), (B64, &k4), (B65, &k5)],
            ),
            &mut k6,
        );

        *y_out = combine(y, h, &[(C1, k1), (C3, &k3), (C4, &k4), (C6, &k6)]);
        for i in 0..STATE_WIDTH {
            y_err[i] =
                h * (DC1 * k1[i] + DC3 * k3[i] + DC4 * k4[i] + DC5 * k5[i] + DC6 * k6[i]);
        }
    }
}

/// Construct the stepper for `kind`, bound to `equation`.
///
/// Every kind yields a stepper over [`STATE_WIDTH`] components.
pub fn build_stepper(kind: StepperKind, equation: Arc<dyn EquationOfMotion>) -> Box<dyn Stepper> {
    info!(
        "stepper {} ({}) selected for {}",
        kind.id(),
        kind,
        equation.name()
    );
    let rule: StepRule = match kind {
        StepperKind::ExplicitEuler => explicit_euler,
        StepperKind::ImplicitEuler => implicit_euler,
        StepperKind::SimpleRunge => simple_runge,
        StepperKind::SimpleHeum => simple_heum,
        StepperKind::ClassicalRk4 => classical_rk4,
        StepperKind::CashKarpRkf45 => return Box::new(CashKarp { equation }),
    };
    Box::new(DoublingStepper {
        kind,
        rule,
        equation,
    })
}

impl fmt::Debug for dyn Stepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stepper")
            .field("kind", &self.kind())
            .field("equation", &self.equation().name())
            .finish()
    }
}
