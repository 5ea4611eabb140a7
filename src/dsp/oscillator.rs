use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase Accumulator
=================

Every oscillator here is the same machine: a phase in [0, 1) that advances by
`frequency / sample_rate` each sample and wraps. The waveform is just a
function of that phase.

    sine:  sin(TAU * phase)
    saw:   2 * phase - 1          (naive, not band-limited)

Frequency is passed per sample, so a vibrato or glide can move it every
sample without the oscillator knowing anything about modulation.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Saw,
}

#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self { waveform, phase: 0.0 }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorWaveform::Saw)
    }

    /// Emit the sample at the current phase, then advance by one sample.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = match self.waveform {
            OscillatorWaveform::Sine => (TAU * self.phase).sin(),
            OscillatorWaveform::Saw => 2.0 * self.phase - 1.0,
        };

        let increment = frequency / sample_rate;
        if increment.is_finite() {
            self.phase = (self.phase + increment).rem_euclid(1.0);
        }

        out
    }

    pub fn render(&mut self, buffer: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_output_range() {
        let mut osc = OscillatorBlock::sine();
        let mut buffer = vec![0.0; 1024];
        osc.render(&mut buffer, 440.0, 48_000.0);
        assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(buffer.iter().any(|s| *s > 0.9));
    }

    #[test]
    fn saw_ramps_and_wraps() {
        let mut osc = OscillatorBlock::sawtooth();
        // quarter-cycle steps
        let samples: Vec<f32> = (0..5).map(|_| osc.next_sample(1.0, 4.0)).collect();
        assert_eq!(samples, vec![-1.0, -0.5, 0.0, 0.5, -1.0]);
    }

    #[test]
    fn phase_stays_in_unit_interval() {
        let mut osc = OscillatorBlock::sine();
        for _ in 0..10_000 {
            osc.next_sample(19_000.0, 44_100.0);
            assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    #[test]
    fn non_finite_frequency_holds_phase() {
        let mut osc = OscillatorBlock::sine();
        osc.next_sample(1_000.0, 48_000.0);
        let phase = osc.phase();
        osc.next_sample(f32::NAN, 48_000.0);
        assert_eq!(osc.phase(), phase);
    }
}
