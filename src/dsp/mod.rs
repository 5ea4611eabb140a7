//! Low-level DSP primitives used by the voice graphs.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the per-sample
//! math; parameter plumbing and note lifecycle live a layer up.

/// Piecewise-linear segment envelope with a sustain point.
pub mod envelope;
/// One-pole low-pass / high-pass filter.
pub mod filter;
/// Amplitude tracker used for auto-free and metering.
pub mod follower;
/// Vibrato: sine LFO whose rate follows its own envelope.
pub mod lfo;
/// Phase-accumulating oscillators.
pub mod oscillator;
/// Mono → stereo pan laws.
pub mod pan;

pub use envelope::{Envelope, EnvelopeStage};
pub use filter::{FilterType, OnePole};
pub use follower::EnvFollower;
pub use lfo::Vibrato;
pub use oscillator::{OscillatorBlock, OscillatorWaveform};
pub use pan::{PanLaw, Panner};
