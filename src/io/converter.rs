use crate::io::midi::PITCH_BEND_CENTER;

/// Equal-tempered frequency of a note relative to `reference` (the pitch of
/// note 69). Identifiers outside the MIDI range extrapolate.
#[inline]
pub fn note_to_freq(note: i32, reference: f64) -> f64 {
    reference * 2.0_f64.powf((note as f64 - 69.0) / 12.0)
}

/// A4 = 432 Hz tuning.
#[inline]
pub fn midi_note_to_freq(note: u8) -> f64 {
    note_to_freq(note as i32, 432.0)
}

/// Pitch-wheel position mapped to -1.0..=1.0 (centre = 0).
#[inline]
pub fn pitch_bend_to_bipolar(value: u16) -> f64 {
    let centered = value.min(0x3FFF) as f64 - PITCH_BEND_CENTER as f64;
    if centered < 0.0 {
        centered / PITCH_BEND_CENTER as f64
    } else {
        centered / (0x3FFF - PITCH_BEND_CENTER) as f64
    }
}

/// 7-bit controller value mapped to 0.0..=1.0, with 64 landing on exactly 0.5
/// so centred controllers (pan, balance) read as centred.
#[inline]
pub fn cc_to_unit(value: u8) -> f64 {
    let value = value.min(127) as f64;
    if value < 64.0 {
        value / 128.0
    } else {
        0.5 + (value - 64.0) / 126.0
    }
}

/// Frequency multiplier for a bend in semitones.
#[inline]
pub fn semitones_to_ratio(semitones: f64) -> f64 {
    2.0_f64.powf(semitones / 12.0)
}
