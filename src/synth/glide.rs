//! Portamento for continuously played instruments.
//!
//! The controller runs on the control/animation thread. Notes and pointer
//! moves only set targets; `update` then eases the live voice's parameters
//! toward them, scaled by the frame time so the glide speed does not depend
//! on how often it is called.

use crate::{config::EngineConfig, param::ParamStore, voices::names, Result};

use super::voice::NoteId;

/// Note identifier of the held voice a glide instrument plays through.
pub const DRONE_ID: NoteId = -1;

/*
Glide Phases
============

Time is measured from the last note that "counted" as a new note: a note-on
only restarts the clock if the previous one was more than 0.6 s ago, so fast
runs glide legato instead of re-swelling on every note.

    t ≤ 0.4 s   amplitude = base + sin(3t) * 0.3 (swell)
    t > 0.4 s   amplitude glides back to base

Frequency glides toward the target the whole time.

    glide(cur, target) = cur + (target - cur) * min(dt * rate, 1)

On top of that a small wobble, sin(40 * timer) * wobble * dt Hz, keeps the
pitch from sounding synthetic. Pointer control writes frequency and
amplitude directly and bypasses all of this until the next note-on.
*/

const SWELL_TIME: f64 = 0.4;
const SWELL_SPEED: f32 = 3.0;
const SWELL_DEPTH: f32 = 0.3;
const NOTE_RESTART_GAP: f64 = 0.6;
const WOBBLE_SPEED: f32 = 40.0;

/// Offset between pointer x and frequency, in Hz.
const POINTER_FREQ_OFFSET: f32 = 400.0;
/// Dead band at the bottom of the pointer surface, in pixels.
const POINTER_FLOOR: f32 = 50.0;

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[derive(Debug, Clone)]
pub struct GlideController {
    rate: f32,
    wobble: f32,
    timer: f64,
    since_note: f64,
    pointer_mode: bool,
}

impl GlideController {
    pub fn new(rate: f32, wobble: f32) -> Self {
        Self {
            rate,
            wobble,
            timer: 0.0,
            since_note: 0.0,
            pointer_mode: false,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.glide_rate, config.glide_wobble)
    }

    /// Aim the glide at `frequency_hz` and leave pointer mode.
    pub fn note_on(&mut self, frequency_hz: f64, params: &ParamStore) -> Result<()> {
        self.pointer_mode = false;
        if self.since_note > NOTE_RESTART_GAP {
            self.since_note = 0.0;
        }
        params.set(names::TARGET_FREQUENCY, frequency_hz)?;
        Ok(())
    }

    /// Play directly from a pointer position on a surface `height` pixels tall.
    pub fn pointer_moved(&mut self, x: f32, y: f32, height: f32, params: &ParamStore) -> Result<()> {
        self.pointer_mode = true;

        let amplitude = if height > 0.0 {
            ((height - (y + POINTER_FLOOR)) / (height * 0.8)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        params.set(names::FREQUENCY, f64::from(x + POINTER_FREQ_OFFSET))?;
        let stored = params.set(names::AMPLITUDE, f64::from(amplitude))?;
        params.set(names::BASE_AMPLITUDE, stored)?;
        Ok(())
    }

    /// Advance by `dt` seconds and move the voice's pitch and loudness.
    pub fn update(&mut self, dt: f64, params: &ParamStore) -> Result<()> {
        self.timer += dt;
        self.since_note += dt;

        if self.pointer_mode || !(dt.is_finite() && dt > 0.0) {
            return Ok(());
        }

        let dt = dt as f32;
        let step = (dt * self.rate).min(1.0);

        let frequency = params.get(names::FREQUENCY)? as f32;
        let target = params.get(names::TARGET_FREQUENCY)? as f32;
        let base = params.get(names::BASE_AMPLITUDE)? as f32;
        let current = params.get(names::AMPLITUDE)? as f32;

        let mut new_frequency = lerp(frequency, target, step);
        let new_amplitude = if self.since_note <= SWELL_TIME {
            base + (self.since_note as f32 * SWELL_SPEED).sin() * SWELL_DEPTH
        } else {
            lerp(current, base, step)
        };

        new_frequency += (self.timer as f32 * WOBBLE_SPEED).sin() * self.wobble * dt;

        params.set(names::FREQUENCY, f64::from(new_frequency))?;
        params.set(names::AMPLITUDE, f64::from(new_amplitude))?;
        Ok(())
    }

    pub fn pointer_mode(&self) -> bool {
        self.pointer_mode
    }

    /// Seconds since the last note that restarted the clock.
    pub fn since_note(&self) -> f64 {
        self.since_note
    }
}
