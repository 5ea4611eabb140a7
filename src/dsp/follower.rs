use crate::dsp::filter::OnePole;

/// Default smoothing cutoff of the follower, in Hz.
pub const FOLLOWER_CUTOFF: f32 = 10.0;

/// Smoothed running estimate of a signal's amplitude: a one-pole low-pass of
/// `|x|`. Voices use it to decide when a released note has gone silent.
#[derive(Debug, Clone)]
pub struct EnvFollower {
    smoother: OnePole,
}

impl EnvFollower {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_cutoff(FOLLOWER_CUTOFF, sample_rate)
    }

    pub fn with_cutoff(cutoff_hz: f32, sample_rate: f32) -> Self {
        Self {
            smoother: OnePole::lowpass(cutoff_hz, sample_rate),
        }
    }

    /// Track one sample and return the input unchanged.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.smoother.next_sample(input.abs());
        input
    }

    pub fn value(&self) -> f32 {
        // y1 of a low-pass is its output
        self.smoother.peek()
    }

    pub fn reset(&mut self) {
        self.smoother.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscillatorBlock;

    #[test]
    fn tracks_sine_amplitude() {
        let mut follower = EnvFollower::new(48_000.0);
        let mut osc = OscillatorBlock::sine();
        for _ in 0..48_000 {
            follower.process(0.5 * osc.next_sample(440.0, 48_000.0));
        }
        // mean of |0.5 sin| is 0.5 * 2/pi
        assert!((follower.value() - 0.318).abs() < 0.02, "{}", follower.value());
    }

    #[test]
    fn decays_toward_zero_on_silence() {
        let mut follower = EnvFollower::new(48_000.0);
        for _ in 0..4_800 {
            follower.process(1.0);
        }
        assert!(follower.value() > 0.9);

        for _ in 0..48_000 {
            follower.process(0.0);
        }
        assert!(follower.value() < 0.001);
    }

    #[test]
    fn passes_signal_through() {
        let mut follower = EnvFollower::new(48_000.0);
        assert_eq!(follower.process(-0.25), -0.25);
    }
}
