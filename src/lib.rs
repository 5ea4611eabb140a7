//! Realtime-safe polyphonic voice engine.
//!
//! A [`synth::poly::PolySynth`] owns a fixed arena of voices, each one a small
//! per-note DSP graph (see [`voices`]). Control threads talk to it through a
//! lock-free command ring and per-parameter atomic cells; the audio thread
//! drains the ring at block boundaries and renders every sounding voice.

pub mod config;
pub mod dsp;
pub mod error;
pub mod graph; // Per-note DSP graph seam
pub mod io;
pub mod param;
pub mod synth; // Voice management and polyphony
pub mod voices;

pub use config::{EngineConfig, InstrumentKind, RetriggerPolicy, StealPolicy};
pub use error::{Error, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Follower level below which a released voice counts as silent.
pub const SILENCE_THRESHOLD: f32 = 0.001;
