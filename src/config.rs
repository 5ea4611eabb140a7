//! Engine configuration.
//!
//! Everything the engine needs to know before the audio stream starts. Values
//! are validated once in [`EngineConfig::validate`]; nothing here is read on
//! the audio thread after construction.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::Error, Result, MAX_BLOCK_SIZE, SILENCE_THRESHOLD};

/// What to do with a note-on when every voice is sounding.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StealPolicy {
    /// Drop the new note and report `PoolExhausted`.
    Reject,
    /// Take over the oldest voice, preferring ones already releasing.
    #[default]
    StealOldest,
}

/// What to do with a note-on for an identifier that is already sounding.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetriggerPolicy {
    /// Restart the envelopes on the voice already mapped to the identifier.
    #[default]
    Retrigger,
    /// Keep the sounding voice untouched.
    Ignore,
}

/// Which voice graph the pool is built from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstrumentKind {
    /// Sine keyboard voice, one voice per MIDI note.
    #[default]
    SineEnv,
    /// Single gliding voice driven by continuous control.
    Theremin,
}

impl InstrumentKind {
    /// Pool exhaustion and duplicate note-on policies used for each instrument.
    ///
    /// The keyboard voice steals (a held chord should never go silent) and
    /// retriggers repeated keys. The theremin only ever has one voice, so a
    /// new note takes it over and restarts its envelopes.
    pub fn default_policies(self) -> (StealPolicy, RetriggerPolicy) {
        match self {
            InstrumentKind::SineEnv => (StealPolicy::StealOldest, RetriggerPolicy::Retrigger),
            InstrumentKind::Theremin => (StealPolicy::StealOldest, RetriggerPolicy::Retrigger),
        }
    }

    /// Number of voices the instrument is meant to run with.
    pub fn default_voices(self) -> usize {
        match self {
            InstrumentKind::SineEnv => 16,
            InstrumentKind::Theremin => 1,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub max_voices: usize,
    /// Largest block rendered in one pass; bigger host buffers are split.
    pub max_block_size: usize,
    /// Capacity of the control → audio command ring.
    pub queue_capacity: usize,
    pub steal_policy: StealPolicy,
    pub retrigger_policy: RetriggerPolicy,
    /// Frequency of MIDI note 69 in Hz.
    pub reference_pitch: f64,
    pub follower_threshold: f32,
    /// Glide speed of the continuous controller, in 1/seconds.
    pub glide_rate: f32,
    /// Pitch wobble added by the glide controller, in Hz per second.
    pub glide_wobble: f32,
    /// Semitones reached at full pitch-bend deflection.
    pub pitch_bend_range: f64,
    /// Only accept channel messages on this channel (0-15).
    pub midi_channel: Option<u8>,
    pub instrument: InstrumentKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let instrument = InstrumentKind::default();
        let (steal_policy, retrigger_policy) = instrument.default_policies();

        Self {
            sample_rate: 48_000.0,
            max_voices: instrument.default_voices(),
            max_block_size: 512,
            queue_capacity: 256,
            steal_policy,
            retrigger_policy,
            reference_pitch: 432.0,
            follower_threshold: SILENCE_THRESHOLD,
            glide_rate: 4.0,
            glide_wobble: 600.0,
            pitch_bend_range: 2.0,
            midi_channel: None,
            instrument,
        }
    }
}

impl EngineConfig {
    /// Defaults for a given instrument, including its voice count and policies.
    pub fn for_instrument(instrument: InstrumentKind) -> Self {
        let (steal_policy, retrigger_policy) = instrument.default_policies();
        Self {
            max_voices: instrument.default_voices(),
            steal_policy,
            retrigger_policy,
            instrument,
            ..Self::default()
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn with_steal_policy(mut self, policy: StealPolicy) -> Self {
        self.steal_policy = policy;
        self
    }

    pub fn with_retrigger_policy(mut self, policy: RetriggerPolicy) -> Self {
        self.retrigger_policy = policy;
        self
    }

    pub fn with_midi_channel(mut self, channel: Option<u8>) -> Self {
        self.midi_channel = channel;
        self
    }

    pub fn with_max_block_size(mut self, frames: usize) -> Self {
        self.max_block_size = frames;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.max_voices == 0 {
            return Err(Error::InvalidConfig("max_voices must be at least 1".into()));
        }
        if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            return Err(Error::InvalidConfig(format!(
                "max_block_size must be in 1..={}, got {}",
                MAX_BLOCK_SIZE, self.max_block_size
            )));
        }
        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfig("queue_capacity must be at least 1".into()));
        }
        if !(self.reference_pitch.is_finite() && self.reference_pitch > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "reference_pitch must be positive, got {}",
                self.reference_pitch
            )));
        }
        if !(self.follower_threshold.is_finite() && self.follower_threshold > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "follower_threshold must be positive, got {}",
                self.follower_threshold
            )));
        }
        if !(self.glide_rate.is_finite() && self.glide_rate >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "glide_rate must be non-negative, got {}",
                self.glide_rate
            )));
        }
        if let Some(channel) = self.midi_channel {
            if channel > 15 {
                return Err(Error::InvalidConfig(format!(
                    "midi_channel must be 0-15, got {}",
                    channel
                )));
            }
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        tracing::debug!(?config, "loaded engine config");
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::for_instrument(InstrumentKind::Theremin)
            .validate()
            .is_ok());
    }

    #[test]
    fn theremin_runs_a_single_voice() {
        let config = EngineConfig::for_instrument(InstrumentKind::Theremin);
        assert_eq!(config.max_voices, 1);
        assert_eq!(config.instrument, InstrumentKind::Theremin);
    }

    #[test]
    fn rejects_empty_pool() {
        let config = EngineConfig::default().with_max_voices(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_oversized_blocks() {
        let config = EngineConfig::default().with_max_block_size(MAX_BLOCK_SIZE + 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_channel() {
        let config = EngineConfig::default().with_midi_channel(Some(16));
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_partial_json_over_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "max_voices": 4, "steal_policy": "Reject", "instrument": "Theremin" }"#,
        )
        .unwrap();

        assert_eq!(config.max_voices, 4);
        assert_eq!(config.steal_policy, StealPolicy::Reject);
        assert_eq!(config.instrument, InstrumentKind::Theremin);
        assert_eq!(config.reference_pitch, 432.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_validation_errors_surface() {
        let err = EngineConfig::from_json_str(r#"{ "sample_rate": -1.0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
