use crate::MIN_TIME;

/*
Segment Envelope
================

A breakpoint envelope: four levels joined by three straight-line segments,
with an optional sustain point where the envelope parks until released.

  Level
    L1 ┐     ╱‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾╲
       │    ╱  seg 1          ╲
       │   ╱                   ╲ seg 2 (release)
    L0 └──╱─────────────────────╲── L3 → Time
         seg 0       ▲ sustain point (level index 2)

The amplitude envelope is levels (0, 1, 1, 0) with the sustain point at 2:
attack, an instant hold, sustain, release. The vibrato rate envelope reuses
the same machine with levels (rate1, rate2, rate2, rate1).


Live Segment Lengths
--------------------

Segment lengths are plain fields the owner may rewrite between samples
(voices copy them from their parameter store once per block). Each sample
the envelope moves toward the segment target by

    step = (target - value) / remaining_samples

where `remaining_samples = length * sample_rate - elapsed`. Shortening or
stretching the segment that is running changes how long is left without a
jump in level; segments already finished are never revisited.

Lengths at or below zero (or NaN) are instantaneous: the level snaps to the
segment target and the next segment starts in the same sample.


Release
-------

`release()` jumps to the segment that leaves the sustain point, starting
from whatever level the envelope currently has. Releasing mid-attack
therefore ramps down from the partial level instead of clicking.
*/

pub const SEGMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Running segment `n`, heading for level `n + 1`.
    Segment(usize),
    /// Holding at the sustain level until `release()`.
    Sustain,
    /// Past the last segment.
    Done,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    levels: [f32; SEGMENTS + 1],
    lengths: [f32; SEGMENTS],
    sustain_point: Option<usize>,

    stage: EnvelopeStage,
    value: f32,
    elapsed: f32, // samples spent in the current segment
}

impl Envelope {
    pub fn new(
        levels: [f32; SEGMENTS + 1],
        lengths: [f32; SEGMENTS],
        sustain_point: Option<usize>,
    ) -> Self {
        let sustain_point = sustain_point.filter(|&p| p > 0 && p < SEGMENTS);
        Self {
            levels,
            lengths,
            sustain_point,
            stage: EnvelopeStage::Done,
            value: levels[SEGMENTS],
            elapsed: 0.0,
        }
    }

    /// Attack to 1.0, hold until released, release to 0.0.
    pub fn asr(attack: f32, release: f32) -> Self {
        Self::new([0.0, 1.0, 1.0, 0.0], [attack, 0.0, release], Some(2))
    }

    /// Restart from the first level.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Segment(0);
        self.value = self.levels[0];
        self.elapsed = 0.0;
    }

    /// Leave the sustain phase (or cut attack short) and start releasing.
    pub fn release(&mut self) {
        let release_segment = self.sustain_point.unwrap_or(SEGMENTS - 1);
        let releasing = match self.stage {
            EnvelopeStage::Segment(n) => n < release_segment,
            EnvelopeStage::Sustain => true,
            EnvelopeStage::Done => false,
        };

        if releasing {
            self.stage = EnvelopeStage::Segment(release_segment);
            self.elapsed = 0.0;
        }
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        self.skip_instant(sample_rate);

        if let EnvelopeStage::Segment(n) = self.stage {
            let target = self.levels[n + 1];
            let remaining = self.segment_samples(n, sample_rate) - self.elapsed;

            if remaining <= 1.0 {
                self.value = target;
                self.advance(n);
                self.skip_instant(sample_rate);
            } else {
                self.value += (target - self.value) / remaining;
                self.elapsed += 1.0;
            }
        }

        self.value
    }

    /// Collapse segments with nothing left to run (zero length, or shortened
    /// below the time already spent in them).
    fn skip_instant(&mut self, sample_rate: f32) {
        while let EnvelopeStage::Segment(n) = self.stage {
            if self.segment_samples(n, sample_rate) - self.elapsed > 0.0 {
                break;
            }
            self.value = self.levels[n + 1];
            self.advance(n);
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }

    fn segment_samples(&self, n: usize, sample_rate: f32) -> f32 {
        let length = self.lengths[n];
        if !length.is_finite() || length < MIN_TIME {
            return 0.0;
        }
        length * sample_rate
    }

    fn advance(&mut self, n: usize) {
        let next = n + 1;
        self.elapsed = 0.0;
        self.stage = if Some(next) == self.sustain_point {
            EnvelopeStage::Sustain
        } else if next >= SEGMENTS {
            EnvelopeStage::Done
        } else {
            EnvelopeStage::Segment(next)
        };
    }

    pub fn set_length(&mut self, segment: usize, seconds: f32) {
        if let Some(length) = self.lengths.get_mut(segment) {
            *length = seconds;
        }
    }

    pub fn lengths(&self) -> &[f32; SEGMENTS] {
        &self.lengths
    }

    pub fn set_levels(&mut self, levels: [f32; SEGMENTS + 1]) {
        self.levels = levels;
    }

    pub fn levels(&self) -> &[f32; SEGMENTS + 1] {
        &self.levels
    }

    /// True once the last segment has finished.
    pub fn done(&self) -> bool {
        matches!(self.stage, EnvelopeStage::Done)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}
