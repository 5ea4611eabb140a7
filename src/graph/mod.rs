//! The seam between the voice pool and the per-note DSP graphs.
//!
//! A graph is one concrete struct per instrument (see `voices`); the pool is
//! generic over it, so the audio loop is monomorphised with no dynamic
//! dispatch per voice.

/// Core trait every voice graph implements.
pub mod node;

pub use node::{RenderCtx, VoiceGraph};
