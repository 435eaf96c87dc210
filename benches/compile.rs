//! cargo bench --bench compile
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use regexjit::Machine;

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("compile_literal", |b| {
        b.iter(|| Machine::builder(black_box("needle")).build().unwrap())
    });

    c.bench_function("compile_alternation", |b| {
        b.iter(|| Machine::builder(black_box("cat|dog|bird|fish")).build().unwrap())
    });

    c.bench_function("compile_class_and_repetition", |b| {
        b.iter(|| Machine::builder(black_box("[a-zA-Z0-9_]+@[a-zA-Z0-9.]+")).build().unwrap())
    });

    c.bench_function("compile_bounded_repetition", |b| {
        b.iter(|| Machine::builder(black_box("a{2,8}b{1,4}c{3}")).build().unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
