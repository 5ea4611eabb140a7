use std::sync::Arc;

use crate::param::ParamStore;

/// Context passed to voice graphs on note events and during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - velocity: Note intensity, 0.0-1.0
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub velocity: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            velocity: 1.0,
        }
    }

    /// Context for a MIDI velocity (0-127).
    pub fn from_velocity(sample_rate: f32, velocity: u8) -> Self {
        Self {
            sample_rate,
            velocity: velocity.min(127) as f32 / 127.0,
        }
    }
}

/// One instance of an instrument's signal chain.
///
/// Implementations own their [`ParamStore`] and read it at the granularity
/// they document: latched values in `note_on`, continuous values once per
/// `render_block`, per-sample modulation values inside the sample loop.
pub trait VoiceGraph: Send {
    /// The voice's parameters, shared with control threads.
    fn params(&self) -> &Arc<ParamStore>;

    /// Triggered when a note starts
    ///
    /// Resets envelopes and re-latches trigger-time parameters.
    fn note_on(&mut self, ctx: &RenderCtx);

    /// Triggered when a note is released
    fn note_off(&mut self, ctx: &RenderCtx);

    /// Write the pitch the next note should play at.
    fn set_frequency(&mut self, frequency_hz: f64);

    /// Render and *add* `left.len()` frames into the two channels.
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx);

    /// True once the amplitude envelope has finished its release.
    fn envelope_done(&self) -> bool;

    /// Envelope-follower estimate of the output amplitude.
    fn follower_level(&self) -> f32;

    /// Frequency used by the last rendered block (for visualization).
    fn frequency(&self) -> f32;

    /// Amplitude used by the last rendered block (for visualization).
    fn amplitude(&self) -> f32;

    /// Clear filter and follower memories after a bad block.
    fn reset_state(&mut self);
}
