//! Criterion micro-benchmarks for stepper and chord search throughput.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use superpose_bench::reference_profile;
use superpose_core::FieldVector;
use superpose_stepper::{build_stepper, state_from, LorentzEquation, StepperKind, STATE_WIDTH};
use superpose_test_utils::MockEvaluator;

fn bench_single_step(c: &mut Criterion) {
    let y = state_from([0.0; 3], [100.0, 0.0, 0.0]);
    for kind in StepperKind::ALL {
        let stepper = build_stepper(kind, Arc::new(LorentzEquation::proton()));
        let mut fields = MockEvaluator::new(FieldVector::magnetic_only([0.0, 0.0, 1.0]));
        let mut dydx = [0.0; STATE_WIDTH];
        stepper.derivatives(&mut fields, &y, &mut dydx);
        let mut y_out = [0.0; STATE_WIDTH];
        let mut y_err = [0.0; STATE_WIDTH];
        c.bench_function(&format!("step_{kind}"), |b| {
            b.iter(|| {
                stepper.step(&mut fields, black_box(&y), &dydx, 10.0, &mut y_out, &mut y_err);
                black_box(&y_out);
            });
        });
    }
}

fn bench_chord_through_beamline(c: &mut Criterion) {
    let mut field = reference_profile();
    let mut propagation = field.propagation();
    let y = state_from([1.0, 1.0, 0.0], [0.0, 0.0, 200.0]);
    c.bench_function("find_next_chord_reference", |b| {
        b.iter(|| black_box(propagation.find_next_chord(black_box(&y), 100.0)));
    });
}

criterion_group!(benches, bench_single_step, bench_chord_through_beamline);
criterion_main!(benches);
