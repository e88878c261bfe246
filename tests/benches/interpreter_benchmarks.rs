//! # Interpreter Benchmarks
//!
//! Validates throughput claims for the execution core:
//!
//! | Component | Claim |
//! |-----------|-------|
//! | Instruction dispatch | > 10M simple instructions/sec |
//! | Keccak programs | > 100 MB/s hashed through memory |
//! | Storage programs | > 100K journaled writes/sec |
//! | Jump-table analysis | > 200 MB/s over raw bytecode |
//! | Registry construction | < 50 us per protocol version |
//!
//! Run with: `cargo bench -p evm-exec-tests`

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use evm_exec::prelude::*;
use rand::Rng;

// =============================================================================
// FIXTURES
// =============================================================================

fn interpreter() -> Interpreter<InMemoryState> {
    Interpreter::new(VmConfig::default(), Arc::new(InMemoryState::new()))
}

fn context(gas_limit: u64) -> ExecutionContext {
    ExecutionContext {
        gas_limit,
        ..ExecutionContext::default()
    }
}

/// PUSH2 n, then a decrement loop back to the JUMPDEST until zero.
fn countdown_program(iterations: u16) -> Vec<u8> {
    let [hi, lo] = iterations.to_be_bytes();
    vec![
        0x61, hi, lo, // PUSH2 iterations
        0x5B, // JUMPDEST
        0x60, 0x01, // PUSH1 1
        0x90, // SWAP1
        0x03, // SUB
        0x80, // DUP1
        0x60, 0x03, // PUSH1 3
        0x57, // JUMPI
        0x00, // STOP
    ]
}

/// Flat-stack arithmetic: n repetitions of PUSH, PUSH, ADD, POP.
fn arithmetic_program(pairs: usize) -> Vec<u8> {
    let mut code = Vec::with_capacity(6 * pairs + 1);
    for _ in 0..pairs {
        code.extend_from_slice(&[0x60, 0x01, 0x60, 0x02, 0x01, 0x50]);
    }
    code.push(0x00);
    code
}

/// KECCAK256 over `size` zeroed memory bytes, price and expansion included.
fn hashing_program(size: u16) -> Vec<u8> {
    let [hi, lo] = size.to_be_bytes();
    vec![
        0x61, hi, lo, // PUSH2 size
        0x60, 0x00, // PUSH1 0
        0x20, // KECCAK256
        0x50, // POP
        0x00, // STOP
    ]
}

/// SSTORE to `slots` distinct fresh slots.
fn storage_program(slots: u8) -> Vec<u8> {
    let mut code = Vec::with_capacity(5 * usize::from(slots) + 1);
    for key in 0..slots {
        code.extend_from_slice(&[0x60, 0xFF, 0x60, key, 0x55]);
    }
    code.push(0x00);
    code
}

// =============================================================================
// INSTRUCTION DISPATCH
// =============================================================================

fn bench_instruction_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpreter_dispatch");
    group.measurement_time(Duration::from_secs(10));

    for iterations in [100u16, 1_000] {
        let vm = interpreter();
        let code = Arc::new(Code::new(Bytes::from_vec(countdown_program(iterations))));
        // Seven instructions per loop iteration.
        group.throughput(Throughput::Elements(u64::from(iterations) * 7));
        group.bench_with_input(
            BenchmarkId::new("countdown_loop", iterations),
            &code,
            |b, code| {
                b.iter(|| {
                    let result = vm.execute_code(context(10_000_000), Arc::clone(code));
                    black_box(result.gas_used)
                });
            },
        );
    }

    for pairs in [64usize, 256] {
        let vm = interpreter();
        let code = Arc::new(Code::new(Bytes::from_vec(arithmetic_program(pairs))));
        group.throughput(Throughput::Elements(pairs as u64 * 4));
        group.bench_with_input(
            BenchmarkId::new("linear_arithmetic", pairs),
            &code,
            |b, code| {
                b.iter(|| {
                    let result = vm.execute_code(context(10_000_000), Arc::clone(code));
                    black_box(result.gas_used)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// MEMORY AND HASHING
// =============================================================================

fn bench_hashing_programs(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpreter_hashing");
    group.measurement_time(Duration::from_secs(10));

    for size in [32u16, 1_024, 8_192] {
        let vm = interpreter();
        let code = Arc::new(Code::new(Bytes::from_vec(hashing_program(size))));
        group.throughput(Throughput::Bytes(u64::from(size)));
        group.bench_with_input(BenchmarkId::new("keccak", size), &code, |b, code| {
            b.iter(|| {
                let result = vm.execute_code(context(10_000_000), Arc::clone(code));
                black_box(result.gas_used)
            });
        });
    }

    group.finish();
}

// =============================================================================
// STORAGE JOURNAL
// =============================================================================

fn bench_storage_programs(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpreter_storage");
    group.measurement_time(Duration::from_secs(10));

    for slots in [16u8, 64] {
        let vm = interpreter();
        let code = Arc::new(Code::new(Bytes::from_vec(storage_program(slots))));
        group.throughput(Throughput::Elements(u64::from(slots)));
        group.bench_with_input(
            BenchmarkId::new("journaled_writes", slots),
            &code,
            |b, code| {
                b.iter(|| {
                    let result = vm.execute_code(context(10_000_000), Arc::clone(code));
                    black_box(result.state_changes.len())
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// CODE ANALYSIS AND REGISTRY
// =============================================================================

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_analysis");
    group.measurement_time(Duration::from_secs(10));

    let mut rng = rand::thread_rng();
    for size in [1_024usize, 24_576] {
        let bytes: Vec<u8> = (0..size).map(|_| rng.gen()).collect();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("jumpdest_scan", size),
            &bytes,
            |b, bytes| {
                b.iter(|| black_box(Code::new(Bytes::from_slice(bytes))));
            },
        );
    }

    group.bench_function("registry_construction", |b| {
        b.iter(|| black_box(OperationRegistry::new(EvmVersion::Shanghai)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_instruction_dispatch,
    bench_hashing_programs,
    bench_storage_programs,
    bench_analysis
);
criterion_main!(benches);
