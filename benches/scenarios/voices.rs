//! Benchmarks for complete voice graphs.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polyvox::graph::{RenderCtx, VoiceGraph};
use polyvox::voices::{SineEnv, Theremin};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = RenderCtx::from_velocity(SAMPLE_RATE, 100);

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // === SINE KEYBOARD VOICE ===
        // sine → envelope → pan, the baseline cost of one key
        let Ok(mut sine) = SineEnv::new(SAMPLE_RATE) else {
            return;
        };
        sine.set_frequency(432.0);
        sine.note_on(&ctx);

        group.bench_with_input(BenchmarkId::new("sine_env", size), &size, |b, _| {
            b.iter(|| {
                sine.render_block(black_box(&mut left), black_box(&mut right), &ctx);
            })
        });

        // === THEREMIN ===
        // two oscillators, vibrato with rate envelope, two filters
        let Ok(mut theremin) = Theremin::new(SAMPLE_RATE) else {
            return;
        };
        theremin.set_frequency(432.0);
        theremin.note_on(&ctx);

        group.bench_with_input(BenchmarkId::new("theremin", size), &size, |b, _| {
            b.iter(|| {
                theremin.render_block(black_box(&mut left), black_box(&mut right), &ctx);
            })
        });
    }

    group.finish();
}
