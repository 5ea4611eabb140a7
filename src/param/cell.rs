//! Lock-free value cell shared between control threads and the audio thread.

use std::sync::atomic::Ordering;

use atomic_float::AtomicF64;

/// Cache-line aligned atomic f64.
#[derive(Debug)]
#[repr(align(64))]
pub struct ParamCell {
    value: AtomicF64,
}

impl ParamCell {
    pub fn new(value: f64) -> Self {
        Self {
            value: AtomicF64::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.value.store(value, Ordering::Release);
    }
}

impl Default for ParamCell {
    fn default() -> Self {
        Self::new(0.0)
    }
}
