//! Benchmarks for the voice pool.
//!
//! These drive `PolySynth` through its command ring exactly as the audio
//! callback does, with every voice of the pool sounding.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polyvox::{
    synth::{PolySynth, SynthMessage},
    voices::SineEnv,
    EngineConfig,
};
use rtrb::RingBuffer;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_poly(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/poly");

    for &voices in &[4usize, 16] {
        for &size in BLOCK_SIZES {
            let config = EngineConfig::default()
                .with_sample_rate(SAMPLE_RATE)
                .with_max_voices(voices);
            let (mut tx, rx) = RingBuffer::<SynthMessage>::new(config.queue_capacity);
            let Ok(mut synth) = PolySynth::new(&config, SineEnv::new, rx) else {
                return;
            };

            // Hold a cluster of keys so the whole pool is busy
            for i in 0..voices {
                let _ = tx.push(SynthMessage::NoteOn {
                    id: 48 + i as i32,
                    velocity: 100,
                    frequency: None,
                });
            }

            let mut data = vec![0.0f32; size * 2];
            group.bench_with_input(
                BenchmarkId::new(format!("sine_env_x{voices}"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        synth.render_interleaved(black_box(&mut data), 2);
                    })
                },
            );
        }
    }

    group.finish();
}
