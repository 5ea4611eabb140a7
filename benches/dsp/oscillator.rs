//! Benchmarks for the phase oscillators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polyvox::dsp::OscillatorBlock;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut sine = OscillatorBlock::sine();
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| sine.render(black_box(&mut buffer), black_box(432.0), SAMPLE_RATE))
        });

        let mut saw = OscillatorBlock::sawtooth();
        group.bench_with_input(BenchmarkId::new("saw", size), &size, |b, _| {
            b.iter(|| saw.render(black_box(&mut buffer), black_box(432.0), SAMPLE_RATE))
        });
    }

    group.finish();
}
