//! Integration test: evaluation on a ready registry never touches the heap.
//!
//! A counting global allocator wraps `System`. Counts are kept per thread so
//! the test harness's own threads do not disturb the measurement.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use superpose_core::{BoundingBox, FieldVector};
use superpose_field::{FieldRegistry, Quadrupole, UniformField};
use superpose_test_utils::fixtures;

struct CountingAllocator;

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

fn bump() {
    let _ = ALLOCATIONS.try_with(|n| n.set(n.get() + 1));
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        bump();
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        bump();
        System.alloc_zeroed(layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        bump();
        System.realloc(ptr, layout, new_size)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn allocations() -> usize {
    ALLOCATIONS.with(Cell::get)
}

fn loaded_registry() -> FieldRegistry {
    let mut registry = FieldRegistry::new();
    for source in fixtures::box_row(48, FieldVector::magnetic_only([0.0, 0.1, 0.0])) {
        registry.register(source);
    }
    registry.register(Quadrupole::new(
        BoundingBox::cube(-5.0, 60.0).unwrap(),
        0.0,
        0.0,
        0.02,
    ));
    registry.register_boxed(Box::new(UniformField::new(
        BoundingBox::cube(-5.0, 60.0).unwrap(),
        FieldVector::electric_only([0.0, 0.0, 1.0]),
    )));
    registry
}

#[test]
fn ready_registry_evaluates_without_allocating() {
    let mut registry = loaded_registry();
    registry.evaluate(&[0.0, 0.0, 0.5]);

    let before = allocations();
    let mut sum = FieldVector::ZERO;
    for i in 0..2000 {
        let z = (i % 50) as f64 + 0.5;
        sum += registry.evaluate(&[0.3, -0.2, z]);
    }
    assert_eq!(allocations(), before);
    assert!(!sum.is_zero());
}

#[test]
fn rejected_points_do_not_allocate() {
    let mut registry = loaded_registry();
    registry.evaluate(&[0.0, 0.0, 0.5]);

    let before = allocations();
    for i in 0..1000 {
        let bad = if i % 2 == 0 { f64::NAN } else { f64::INFINITY };
        assert!(registry.evaluate(&[0.0, bad, 1.0]).is_zero());
    }
    assert_eq!(allocations(), before);

    let mut empty = FieldRegistry::new();
    empty.commit();
    let before = allocations();
    assert!(empty.evaluate(&[f64::NAN, 0.0, 0.0]).is_zero());
    assert!(empty.evaluate(&[1.0, 2.0, 3.0]).is_zero());
    assert_eq!(allocations(), before);
}
