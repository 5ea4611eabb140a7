//! Vibrato with a rising rate.

use crate::dsp::{envelope::Envelope, oscillator::OscillatorBlock};

/*
Vibrato Rise
============

A plain vibrato is a sine LFO added to the oscillator frequency:

    f(t) = f0 + lfo(t) * depth * f0

Depth here is relative (0.005 = half a percent of the pitch), so the wobble
is the same musical interval at every note.

Players rarely start a note with full vibrato: it speeds up as the note
settles. To get that, the LFO's own rate follows a segment envelope

    rate1 ──rise──▶ rate2 ══ hold while the note is held ══ ──rise──▶ rate1

so the wobble starts slow and accelerates over `rise` seconds. The rate
levels and rise time are read once at note-on; depth is applied by the
caller every sample.
*/

#[derive(Debug, Clone)]
pub struct Vibrato {
    lfo: OscillatorBlock,
    rate_env: Envelope,
}

impl Vibrato {
    pub fn new() -> Self {
        Self {
            lfo: OscillatorBlock::sine(),
            rate_env: Envelope::new([3.5, 8.0, 8.0, 3.5], [0.5, 0.5, 0.5], Some(2)),
        }
    }

    /// Restart the rate envelope with new rates and rise time.
    pub fn trigger(&mut self, rate1: f32, rate2: f32, rise: f32) {
        self.rate_env.set_levels([rate1, rate2, rate2, rate1]);
        for segment in 0..3 {
            self.rate_env.set_length(segment, rise);
        }
        self.rate_env.reset();
    }

    /// Slow back down to the starting rate.
    pub fn release(&mut self) {
        self.rate_env.release();
    }

    /// Next bipolar LFO value (-1..=1).
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let rate = self.rate_env.next_sample(sample_rate);
        self.lfo.next_sample(rate, sample_rate)
    }

    /// Current LFO rate in Hz.
    pub fn rate(&self) -> f32 {
        self.rate_env.value()
    }

    pub fn reset(&mut self) {
        self.lfo.reset();
    }
}

impl Default for Vibrato {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_rises_from_rate1_to_rate2() {
        let mut vibrato = Vibrato::new();
        vibrato.trigger(2.0, 10.0, 0.1);

        vibrato.next_sample(1_000.0);
        assert!(vibrato.rate() < 3.0);

        for _ in 0..200 {
            vibrato.next_sample(1_000.0);
        }
        assert_eq!(vibrato.rate(), 10.0);
    }

    #[test]
    fn output_is_bipolar_unit() {
        let mut vibrato = Vibrato::new();
        vibrato.trigger(5.0, 8.0, 0.2);
        for _ in 0..48_000 {
            let v = vibrato.next_sample(48_000.0);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn release_returns_to_rate1() {
        let mut vibrato = Vibrato::new();
        vibrato.trigger(2.0, 10.0, 0.01);
        for _ in 0..100 {
            vibrato.next_sample(1_000.0);
        }
        vibrato.release();
        for _ in 0..100 {
            vibrato.next_sample(1_000.0);
        }
        assert_eq!(vibrato.rate(), 2.0);
    }
}
