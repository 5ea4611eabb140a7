//! The scripted performances the demo plays, as raw MIDI bytes.

/// One timed MIDI message: seconds from the start, then the bytes.
pub type Cue = (f64, [u8; 3]);

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;
const CONTROL_CHANGE: u8 = 0xB0;
const PITCH_BEND: u8 = 0xE0;

fn chord(at: f64, hold: f64, notes: &[u8], cues: &mut Vec<Cue>) {
    for &note in notes {
        cues.push((at, [NOTE_ON, note, 96]));
        cues.push((at + hold, [NOTE_OFF, note, 0]));
    }
}

/// A four-chord progression, a pan sweep and a bent final note.
pub fn keyboard() -> Vec<Cue> {
    let mut cues = Vec::new();

    chord(0.0, 0.9, &[57, 60, 64], &mut cues); // Am
    chord(1.0, 0.9, &[53, 57, 60], &mut cues); // F
    chord(2.0, 0.9, &[48, 52, 55], &mut cues); // C
    chord(3.0, 0.9, &[55, 59, 62], &mut cues); // G

    for step in 0..=8u8 {
        cues.push((4.0 + f64::from(step) * 0.1, [CONTROL_CHANGE, 10, step * 15]));
    }
    chord(4.0, 1.5, &[69], &mut cues);

    // bend up a semitone and back to centre
    cues.push((5.0, [PITCH_BEND, 0x00, 0x60]));
    cues.push((5.4, [PITCH_BEND, 0x00, 0x40]));
    cues.push((5.6, [CONTROL_CHANGE, 10, 64]));

    cues.sort_by(|a, b| a.0.total_cmp(&b.0));
    cues
}

/// A slow melody the theremin glides between.
pub fn melody() -> Vec<Cue> {
    let notes = [69u8, 72, 76, 74, 72, 71, 69, 64, 69];
    let mut cues: Vec<Cue> = notes
        .iter()
        .enumerate()
        .map(|(i, &note)| (i as f64 * 0.8, [NOTE_ON, note, 100]))
        .collect();

    // more vibrato towards the end
    cues.push((4.0, [CONTROL_CHANGE, 1, 40]));
    cues.sort_by(|a, b| a.0.total_cmp(&b.0));
    cues
}

/// Seconds until the last cue has had time to ring out.
pub fn duration(cues: &[Cue], tail: f64) -> f64 {
    cues.last().map_or(0.0, |cue| cue.0) + tail
}
