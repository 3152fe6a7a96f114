//! Tracks a proton through a short dipole-quadrupole beamline.
//!
//! Run with `RUST_LOG=info cargo run -p superpose-engine --example beamline`
//! to see the configuration log.

use std::error::Error;

use superpose_core::{BoundingBox, FieldVector};
use superpose_engine::{AccuracyParameters, GlobalField, IntegrationConfig};
use superpose_field::{Quadrupole, UniformField};
use superpose_stepper::{momentum, position, state_from, StepperKind};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut field = GlobalField::new();
    field.reconfigure(IntegrationConfig {
        stepper: StepperKind::CashKarpRkf45,
        accuracy: AccuracyParameters {
            delta_chord: 0.25,
            ..AccuracyParameters::default()
        },
    })?;

    field.add_source(Quadrupole::new(
        BoundingBox::new([-50.0, -50.0, 0.0], [50.0, 50.0, 300.0])?,
        0.0,
        0.0,
        0.002,
    ));
    field.add_source(UniformField::new(
        BoundingBox::new([-200.0, -50.0, 500.0], [200.0, 50.0, 1500.0])?,
        FieldVector::magnetic_only([0.0, 0.5, 0.0]),
    ));

    let mut y = state_from([5.0, 0.0, 0.0], [0.0, 0.0, 200.0]);
    let mut path = 0.0;
    let mut propagation = field.propagation();
    while path < 2000.0 {
        let chord = propagation.find_next_chord(&y, 100.0)?;
        y = chord.end_state;
        path += chord.step_length;
        let [x, yy, z] = position(&y);
        println!(
            "s={path:8.2} step={:7.3} x={x:9.4} y={yy:9.4} z={z:9.3} dev={:.4}",
            chord.step_length, chord.chord_deviation
        );
    }

    let [px, py, pz] = momentum(&y);
    println!("final momentum ({px:.4}, {py:.4}, {pz:.4}) MeV/c");
    Ok(())
}
