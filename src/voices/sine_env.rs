//! Sine keyboard voice.
//!
//! The plainest useful voice: a sine oscillator shaped by an attack/release
//! envelope, panned into the stereo field. One voice per held key.
//!
//! # Signal Chain
//!
//! 1. Sine oscillator at `frequency`, bent by `pitchBend` semitones
//! 2. × amplitude envelope (`attackTime`, hold, `releaseTime`)
//! 3. × `amplitude` × note velocity
//! 4. envelope follower (auto-free) → constant-power pan by `pan`

use std::sync::Arc;

use crate::{
    dsp::{Envelope, EnvFollower, OscillatorBlock, Panner},
    graph::{RenderCtx, VoiceGraph},
    io::converter::semitones_to_ratio,
    param::{ParamId, ParamKind, ParamStore},
    Result,
};

use super::{names, MAX_BEND_SEMITONES};

pub struct SineEnv {
    params: Arc<ParamStore>,
    amplitude: ParamId,
    frequency: ParamId,
    attack: ParamId,
    release: ParamId,
    pan_pos: ParamId,
    bend: ParamId,

    osc: OscillatorBlock,
    env: Envelope,
    pan: Panner,
    follower: EnvFollower,

    velocity_gain: f32, // latched at note-on
    last_frequency: f32,
    last_amplitude: f32,
}

impl SineEnv {
    pub fn new(sample_rate: f32) -> Result<Self> {
        let mut params = ParamStore::new();
        let amplitude = params.create(names::AMPLITUDE, 0.3, 0.0, 1.0, ParamKind::Continuous)?;
        let frequency = params.create(names::FREQUENCY, 60.0, 20.0, 5000.0, ParamKind::Continuous)?;
        let attack = params.create(names::ATTACK_TIME, 0.01, 0.01, 3.0, ParamKind::Continuous)?;
        let release = params.create(names::RELEASE_TIME, 0.4, 0.1, 10.0, ParamKind::Continuous)?;
        let pan_pos = params.create(names::PAN, 0.0, -1.0, 1.0, ParamKind::Continuous)?;
        let bend = params.create(
            names::PITCH_BEND,
            0.0,
            -MAX_BEND_SEMITONES,
            MAX_BEND_SEMITONES,
            ParamKind::Continuous,
        )?;

        let env = Envelope::asr(
            params.value_f32(attack),
            params.value_f32(release),
        );

        Ok(Self {
            params: params.into_shared(),
            amplitude,
            frequency,
            attack,
            release,
            pan_pos,
            bend,
            osc: OscillatorBlock::sine(),
            env,
            pan: Panner::default(),
            follower: EnvFollower::new(sample_rate),
            velocity_gain: 1.0,
            last_frequency: 0.0,
            last_amplitude: 0.0,
        })
    }
}

impl VoiceGraph for SineEnv {
    fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.velocity_gain = ctx.velocity.clamp(0.0, 1.0);
        self.env.reset();
    }

    fn note_off(&mut self, _ctx: &RenderCtx) {
        self.env.release();
    }

    fn set_frequency(&mut self, frequency_hz: f64) {
        self.params.set_by_id(self.frequency, frequency_hz);
    }

    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        let store = &*self.params;
        let sample_rate = ctx.sample_rate;

        let frequency =
            (store.value(self.frequency) * semitones_to_ratio(store.value(self.bend))) as f32;
        let amplitude = store.value_f32(self.amplitude) * self.velocity_gain;
        self.env.set_length(0, store.value_f32(self.attack));
        self.env.set_length(2, store.value_f32(self.release));
        self.pan.set_position(store.value_f32(self.pan_pos));

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let s = self.osc.next_sample(frequency, sample_rate)
                * self.env.next_sample(sample_rate)
                * amplitude;
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
        self.follower.reset();
        self.osc.reset();
    }
}
