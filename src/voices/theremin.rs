//! Theremin voice.
//!
//! A single gliding voice meant to be played from continuous control (a
//! pointer or a controller), though it answers to MIDI notes as well.
//!
//! # Signal Chain
//!
//! ```text
//!   vibrato (rate rises vibRate1 → vibRate2 over vibRise)
//!        │  × vibDepth × frequency
//!        ▼
//!   saw(f) + sine(f + 3 Hz)  ──▶ ÷2 ──▶ × envelope × amplitude
//!                                          │
//!                  low-pass ──▶ smoothing low-pass ──▶ follower ──▶ pan
//! ```
//!
//! The 3 Hz offset between the two oscillators gives the slow beating that
//! makes the tone sound "alive". The second filter stage is keyed by
//! `highPassFilter` but smooths rather than thins: it is another one-pole
//! low-pass, so the fundamental always comes through.
//!
//! `vibDepth` is read every sample, everything else continuous is read once
//! per block. Vibrato rates and rise time are latched at note-on.

use std::sync::Arc;

use crate::{
    dsp::{EnvFollower, Envelope, OnePole, OscillatorBlock, Panner, Vibrato},
    graph::{RenderCtx, VoiceGraph},
    io::converter::semitones_to_ratio,
    param::{ParamId, ParamKind, ParamStore},
    Result,
};

use super::{names, MAX_BEND_SEMITONES};

/// Detune of the second oscillator, in Hz.
const BEAT_HZ: f32 = 3.0;

pub struct Theremin {
    params: Arc<ParamStore>,
    amplitude: ParamId,
    frequency: ParamId,
    attack: ParamId,
    release: ParamId,
    pan_pos: ParamId,
    vib_rate1: ParamId,
    vib_rate2: ParamId,
    vib_rise: ParamId,
    vib_depth: ParamId,
    low_pass: ParamId,
    high_pass: ParamId,
    bend: ParamId,

    saw: OscillatorBlock,
    sine: OscillatorBlock,
    vibrato: Vibrato,
    env: Envelope,
    lpf: OnePole,
    smoother: OnePole,
    pan: Panner,
    follower: EnvFollower,

    last_frequency: f32,
    last_amplitude: f32,
}

impl Theremin {
    pub fn new(sample_rate: f32) -> Result<Self> {
        let mut params = ParamStore::new();
        let continuous = ParamKind::Continuous;
        let latched = ParamKind::Latched;

        let amplitude = params.create(names::AMPLITUDE, 0.3, 0.0, 1.0, continuous)?;
        // written by the glide controller, never read by the chain itself
        params.create(names::BASE_AMPLITUDE, 0.3, 0.0, 1.0, continuous)?;
        let frequency = params.create(names::FREQUENCY, 60.0, 20.0, 5000.0, continuous)?;
        params.create(names::TARGET_FREQUENCY, 60.0, 20.0, 5000.0, continuous)?;
        let attack = params.create(names::ATTACK_TIME, 0.01, 0.01, 3.0, continuous)?;
        let release = params.create(names::RELEASE_TIME, 0.1, 0.1, 10.0, continuous)?;
        let pan_pos = params.create(names::PAN, 0.0, -1.0, 1.0, continuous)?;
        let vib_rate1 = params.create(names::VIB_RATE_1, 3.5, 0.2, 20.0, latched)?;
        let vib_rate2 = params.create(names::VIB_RATE_2, 8.0, 0.2, 20.0, latched)?;
        let vib_rise = params.create(names::VIB_RISE, 0.5, 0.1, 2.0, latched)?;
        let vib_depth = params.create(names::VIB_DEPTH, 0.005, 0.0, 0.3, continuous)?;
        let low_pass = params.create(names::LOW_PASS, 800.0, 0.0, 44_000.0, continuous)?;
        let high_pass = params.create(names::HIGH_PASS, 900.0, 0.0, 44_000.0, continuous)?;
        let bend = params.create(
            names::PITCH_BEND,
            0.0,
            -MAX_BEND_SEMITONES,
            MAX_BEND_SEMITONES,
            continuous,
        )?;

        let env = Envelope::asr(params.value_f32(attack), params.value_f32(release));
        let lpf = OnePole::lowpass(params.value_f32(low_pass), sample_rate);
        let smoother = OnePole::lowpass(params.value_f32(high_pass), sample_rate);

        Ok(Self {
            params: params.into_shared(),
            amplitude,
            frequency,
            attack,
            release,
            pan_pos,
            vib_rate1,
            vib_rate2,
            vib_rise,
            vib_depth,
            low_pass,
            high_pass,
            bend,
            saw: OscillatorBlock::sawtooth(),
            sine: OscillatorBlock::sine(),
            vibrato: Vibrato::new(),
            env,
            lpf,
            smoother,
            pan: Panner::default(),
            follower: EnvFollower::new(sample_rate),
            last_frequency: 0.0,
            last_amplitude: 0.0,
        })
    }

    /// Current vibrato LFO rate in Hz.
    pub fn vibrato_rate(&self) -> f32 {
        self.vibrato.rate()
    }
}

impl VoiceGraph for Theremin {
    fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        let store = &*self.params;
        self.env.reset();
        self.vibrato.trigger(
            store.value_f32(self.vib_rate1),
            store.value_f32(self.vib_rate2),
            store.value_f32(self.vib_rise),
        );
    }

    fn note_off(&mut self, _ctx: &RenderCtx) {
        self.env.release();
        self.vibrato.release();
    }

    fn set_frequency(&mut self, frequency_hz: f64) {
        self.params.set_by_id(self.frequency, frequency_hz);
    }

    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        let store = &*self.params;
        let sample_rate = ctx.sample_rate;

        let frequency =
            (store.value(self.frequency) * semitones_to_ratio(store.value(self.bend))) as f32;
        let amplitude = store.value_f32(self.amplitude);
        self.env.set_length(0, store.value_f32(self.attack));
        self.env.set_length(2, store.value_f32(self.release));
        self.lpf.set_cutoff(store.value_f32(self.low_pass));
        self.smoother.set_cutoff(store.value_f32(self.high_pass));
        self.pan.set_position(store.value_f32(self.pan_pos));

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let depth = store.value_f32(self.vib_depth);
            let wobble = self.vibrato.next_sample(sample_rate) * depth * frequency;

            let saw = self.saw.next_sample(frequency + wobble, sample_rate);
            let sine = self.sine.next_sample(frequency + BEAT_HZ + wobble, sample_rate);

            let s = (saw + sine) * 0.5 * self.env.next_sample(sample_rate) * amplitude;
            let s = self.smoother.next_sample(self.lpf.next_sample(s));

            self.follower.process(s);
            let (sl, sr) = self.pan.process(s);
            *l += sl;
            *r += sr;
        }

        self.last_frequency = frequency;
        self.last_amplitude = amplitude;
    }

    fn envelope_done(&self) -> bool {
        self.env.done()
    }

    fn follower_level(&self) -> f32 {
        self.follower.value()
    }

    fn frequency(&self) -> f32 {
        self.last_frequency
    }

    fn amplitude(&self) -> f32 {
        self.last_amplitude
    }

    fn reset_state(&mut self) {
        self.lpf.reset();
        self.smoother.reset();
        self.follower.reset();
        self.saw.reset();
        self.sine.reset();
        self.vibrato.reset();
    }
}
