use std::f32::consts::FRAC_PI_4;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a pan position in `[-1, 1]` maps to left/right gains.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanLaw {
    /// `cos`/`sin` gains; loudness stays even across the field (-3 dB centre).
    #[default]
    ConstantPower,
    /// Gains sum to one (-6 dB centre).
    Linear,
}

#[derive(Debug, Clone)]
pub struct Panner {
    law: PanLaw,
    position: f32,
    left: f32,
    right: f32,
}

impl Panner {
    pub fn new(law: PanLaw) -> Self {
        let mut panner = Self {
            law,
            position: f32::NAN,
            left: 0.0,
            right: 0.0,
        };
        panner.set_position(0.0);
        panner
    }

    /// -1 is hard left, 1 hard right. Out-of-range values clamp; NaN centres.
    pub fn set_position(&mut self, position: f32) {
        let position = if position.is_nan() { 0.0 } else { position.clamp(-1.0, 1.0) };
        if position == self.position {
            return;
        }
        self.position = position;

        (self.left, self.right) = match self.law {
            PanLaw::ConstantPower => {
                let theta = (position + 1.0) * FRAC_PI_4;
                (theta.cos(), theta.sin())
            }
            PanLaw::Linear => ((1.0 - position) * 0.5, (1.0 + position) * 0.5),
        };
    }

    #[inline]
    pub fn process(&self, input: f32) -> (f32, f32) {
        (input * self.left, input * self.right)
    }

    pub fn gains(&self) -> (f32, f32) {
        (self.left, self.right)
    }

    pub fn position(&self) -> f32 {
        self.position
    }
}

impl Default for Panner {
    fn default() -> Self {
        Self::new(PanLaw::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_left_and_right() {
        let mut pan = Panner::default();
        pan.set_position(-1.0);
        let (l, r) = pan.gains();
        assert!((l - 1.0).abs() < 1e-6 && r.abs() < 1e-6);

        pan.set_position(1.0);
        let (l, r) = pan.gains();
        assert!(l.abs() < 1e-6 && (r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn constant_power_centre() {
        let pan = Panner::default();
        let (l, r) = pan.gains();
        assert!((l * l + r * r - 1.0).abs() < 1e-6);
        assert!((l - r).abs() < 1e-6);
    }

    #[test]
    fn linear_centre_splits_evenly() {
        let pan = Panner::new(PanLaw::Linear);
        assert_eq!(pan.process(1.0), (0.5, 0.5));
    }

    #[test]
    fn position_is_clamped() {
        let mut pan = Panner::default();
        pan.set_position(4.0);
        assert_eq!(pan.position(), 1.0);
        pan.set_position(f32::NAN);
        assert_eq!(pan.position(), 0.0);
    }
}
