use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
One-Pole Filter
===============

The simplest recursive filter: one multiply-add of feedback per sample.

    y[n] = a0 * x[n] + b1 * y[n-1]
    b1   = exp(-TAU * cutoff / sample_rate)
    a0   = 1 - b1

That is a 6 dB/octave low-pass. The high-pass is what the low-pass removes:

    hp[n] = x[n] - lp[n]

Coefficients are recomputed only when the cutoff actually changes, which in
the voices happens at most once per block.

| cutoff           | low-pass             | high-pass            |
| ---------------- | -------------------- | -------------------- |
| <= 0 Hz          | silence              | passes everything    |
| >= sample_rate/2 | clamped to Nyquist   | clamped to Nyquist   |
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
}

#[derive(Debug, Clone)]
pub struct OnePole {
    filter_type: FilterType,
    cutoff_hz: f32,
    sample_rate: f32,
    a0: f32,
    b1: f32,
    y1: f32, // low-pass memory
}

impl OnePole {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            filter_type,
            cutoff_hz: f32::NAN,
            sample_rate,
            a0: 1.0,
            b1: 0.0,
            y1: 0.0,
        };
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, sample_rate)
    }

    pub fn highpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, sample_rate)
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        let nyquist = self.sample_rate * 0.5;
        let cutoff = if cutoff_hz.is_finite() {
            cutoff_hz.clamp(0.0, nyquist)
        } else {
            nyquist
        };

        if cutoff == self.cutoff_hz {
            return;
        }

        self.cutoff_hz = cutoff;
        self.b1 = (-TAU * cutoff / self.sample_rate).exp();
        self.a0 = 1.0 - self.b1;
    }

    #[inline]
    pub fn next_sample(&mut self, input: f32) -> f32 {
        self.y1 = self.a0 * input + self.b1 * self.y1;
        match self.filter_type {
            FilterType::LowPass => self.y1,
            FilterType::HighPass => input - self.y1,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.y1 = 0.0;
    }

    /// Last low-pass output, without advancing.
    #[inline]
    pub fn peek(&self) -> f32 {
        self.y1
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }
}
