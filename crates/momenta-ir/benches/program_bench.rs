//! Benchmarks for Momenta program construction and derived queries
//!
//! Run with: cargo bench -p momenta-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use momenta_ir::{FrozenProgram, InsertStrategy, Operation, Program, Qubit, StandardGate};

fn ghz_ops(n: i64) -> Vec<Operation> {
    let mut ops = vec![Operation::gate(StandardGate::H, [Qubit::line(0)]).unwrap()];
    for i in 0..n - 1 {
        ops.push(Operation::gate(StandardGate::CX, [Qubit::line(i), Qubit::line(i + 1)]).unwrap());
    }
    ops.push(Operation::measure(Qubit::line_range(n), "m").unwrap());
    ops
}

/// Benchmark packing operations into moments
fn bench_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("packing");

    for n in &[5_i64, 20, 100] {
        let ops = ghz_ops(*n);
        for strategy in [InsertStrategy::Earliest, InsertStrategy::Inline] {
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), n),
                &ops,
                |b, ops| {
                    b.iter(|| Program::from_content(black_box(ops.clone()), strategy));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark first-use versus cached derived queries
fn bench_derived_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("derived_queries");
    let ops = ghz_ops(100);

    group.bench_function("hash_cold", |b| {
        b.iter(|| {
            let program = FrozenProgram::new(ops.clone(), InsertStrategy::Earliest);
            black_box(program.structural_hash())
        });
    });

    let program = FrozenProgram::new(ops.clone(), InsertStrategy::Earliest);
    program.structural_hash();
    group.bench_function("hash_warm", |b| {
        b.iter(|| black_box(program.structural_hash()));
    });

    group.bench_function("qubits_warm", |b| {
        b.iter(|| black_box(program.qubits().len()));
    });

    group.finish();
}

criterion_group!(benches, bench_packing, bench_derived_queries);
criterion_main!(benches);
