use crate::{graph::VoiceGraph, Result};

/// Factory for creating voices with a specific patch/sound design
///
/// This is the "instrument design" layer - you configure your sound once,
/// then PolySynth uses this factory to fill every slot of its pool with an
/// identical voice. Construction happens before the audio stream starts, so
/// it may allocate and fail.
pub trait VoiceFactory: Send {
    type Voice: VoiceGraph;

    fn create_voice(&self, sample_rate: f32) -> Result<Self::Voice>;
}

impl<F, T> VoiceFactory for F
where
    F: Fn(f32) -> Result<T> + Send,
    T: VoiceGraph,
{
    type Voice = T;

    fn create_voice(&self, sample_rate: f32) -> Result<Self::Voice> {
        self(sample_rate)
    }
}
