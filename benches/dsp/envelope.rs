//! Benchmarks for the segment envelope and vibrato.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polyvox::dsp::{Envelope, Vibrato};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Long attack so every iteration stays on the ramp
        let mut env = Envelope::asr(3.0, 0.4);
        env.reset();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                if env.done() {
                    env.reset();
                }
                env.render(black_box(&mut buffer), SAMPLE_RATE);
            })
        });

        let mut vibrato = Vibrato::new();
        vibrato.trigger(3.5, 8.0, 0.5);
        group.bench_with_input(BenchmarkId::new("vibrato", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = vibrato.next_sample(SAMPLE_RATE);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
