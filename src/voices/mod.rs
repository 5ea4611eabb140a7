//! Ready-made voice graphs.
//!
//! Each voice is one concrete [`VoiceGraph`](crate::graph::VoiceGraph) with
//! its own parameter store. Use them directly with
//! [`PolySynth`](crate::synth::poly::PolySynth), or study them as templates
//! for new instruments.
//!
//! # Example
//!
//! ```ignore
//! use polyvox::voices::{SineEnv, Theremin};
//!
//! let piano_voice = SineEnv::new(48_000.0)?;
//! let theremin_voice = Theremin::new(48_000.0)?;
//! ```

mod sine_env;
mod theremin;

pub use sine_env::SineEnv;
pub use theremin::Theremin;

/// Parameter names shared by the bundled voices.
pub mod names {
    pub const AMPLITUDE: &str = "amplitude";
    pub const BASE_AMPLITUDE: &str = "baseAmplitude";
    pub const FREQUENCY: &str = "frequency";
    pub const TARGET_FREQUENCY: &str = "targetFrequency";
    pub const ATTACK_TIME: &str = "attackTime";
    pub const RELEASE_TIME: &str = "releaseTime";
    pub const PAN: &str = "pan";
    pub const PITCH_BEND: &str = "pitchBend";
    pub const VIB_RATE_1: &str = "vibRate1";
    pub const VIB_RATE_2: &str = "vibRate2";
    pub const VIB_RISE: &str = "vibRise";
    pub const VIB_DEPTH: &str = "vibDepth";
    pub const LOW_PASS: &str = "lowPassFilter";
    pub const HIGH_PASS: &str = "highPassFilter";
}

/// Widest pitch bend any voice accepts, in semitones either way.
pub const MAX_BEND_SEMITONES: f64 = 24.0;
