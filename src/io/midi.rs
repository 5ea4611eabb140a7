//! Raw MIDI bytes → typed channel events.
//!
//! Decoding is pure: the same bytes always give the same event, and nothing
//! ever indexes past the slice it was handed.

use crate::{error::Error, Result};

pub const STATUS_MASK: u8 = 0xF0;
pub const CHANNEL_MASK: u8 = 0x0F;

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const CONTROL_CHANGE: u8 = 0xB0;
pub const PITCH_BEND: u8 = 0xE0;

/// Centre position of the 14-bit pitch wheel.
pub const PITCH_BEND_CENTER: u16 = 0x2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit wheel position, 0..=16383, centre 8192.
    PitchBend { channel: u8, value: u16 },
    /// Anything this engine does not act on (system messages, aftertouch,
    /// program change, stray data bytes).
    Other { status: u8 },
}

impl MidiEvent {
    pub fn channel(&self) -> Option<u8> {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. } => Some(channel),
            MidiEvent::Other { .. } => None,
        }
    }

    /// Raw bytes for a channel event. `Other` carries too little to rebuild.
    pub fn encode(&self) -> Option<[u8; 3]> {
        match *self {
            MidiEvent::NoteOn {
                channel,
                note,
                velocity,
            } => Some([NOTE_ON | (channel & CHANNEL_MASK), note & 0x7F, velocity & 0x7F]),
            MidiEvent::NoteOff {
                channel,
                note,
                velocity,
            } => Some([NOTE_OFF | (channel & CHANNEL_MASK), note & 0x7F, velocity & 0x7F]),
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => Some([
                CONTROL_CHANGE | (channel & CHANNEL_MASK),
                controller & 0x7F,
                value & 0x7F,
            ]),
            MidiEvent::PitchBend { channel, value } => Some([
                PITCH_BEND | (channel & CHANNEL_MASK),
                (value & 0x7F) as u8,
                ((value >> 7) & 0x7F) as u8,
            ]),
            MidiEvent::Other { .. } => None,
        }
    }
}

#[inline]
pub fn is_status_byte(byte: u8) -> bool {
    byte & 0x80 != 0
}

/// Channel voice messages occupy 0x80..=0xEF; 0xF0 and up are system messages.
#[inline]
pub fn is_channel_message(status: u8) -> bool {
    is_status_byte(status) && status < 0xF0
}

/// Decode one complete MIDI message.
///
/// Note on/off, control change and pitch bend must be exactly three bytes,
/// both data bytes below 0x80; anything else is `MalformedMessage`. Unsupported status bytes
/// decode to [`MidiEvent::Other`].
pub fn decode(bytes: &[u8]) -> Result<MidiEvent> {
    let Some(&status) = bytes.first() else {
        return Err(Error::EmptyMessage);
    };

    if !is_channel_message(status) {
        return Ok(MidiEvent::Other { status });
    }

    let kind = status & STATUS_MASK;
    let channel = status & CHANNEL_MASK;

    if !matches!(kind, NOTE_OFF | NOTE_ON | CONTROL_CHANGE | PITCH_BEND) {
        return Ok(MidiEvent::Other { status });
    }

    // a status byte where data belongs ends the message early
    let actual = 1 + bytes[1..].iter().take_while(|b| !is_status_byte(**b)).count();
    let (3, &[_, d1, d2]) = (actual, bytes) else {
        return Err(Error::MalformedMessage {
            status,
            expected: 3,
            actual,
        });
    };

    let event = match kind {
        NOTE_ON => MidiEvent::NoteOn {
            channel,
            note: d1,
            velocity: d2,
        },
        NOTE_OFF => MidiEvent::NoteOff {
            channel,
            note: d1,
            velocity: d2,
        },
        CONTROL_CHANGE => MidiEvent::ControlChange {
            channel,
            controller: d1,
            value: d2,
        },
        _ => MidiEvent::PitchBend {
            channel,
            value: (d2 as u16) << 7 | d1 as u16,
        },
    };

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on() {
        let event = decode(&[0x93, 60, 100]).unwrap();
        assert_eq!(
            event,
            MidiEvent::NoteOn {
                channel: 3,
                note: 60,
                velocity: 100
            }
        );
    }

    #[test]
    fn test_note_off() {
        let event = decode(&[0x80, 69, 0]).unwrap();
        assert_eq!(
            event,
            MidiEvent::NoteOff {
                channel: 0,
                note: 69,
                velocity: 0
            }
        );
    }

    #[test]
    fn test_pitch_bend_is_lsb_first() {
        // lsb = 0x00, msb = 0x40 -> centre
        assert_eq!(
            decode(&[0xE0, 0x00, 0x40]).unwrap(),
            MidiEvent::PitchBend {
                channel: 0,
                value: PITCH_BEND_CENTER
            }
        );
        assert_eq!(
            decode(&[0xE1, 0x7F, 0x7F]).unwrap(),
            MidiEvent::PitchBend {
                channel: 1,
                value: 16383
            }
        );
    }

    #[test]
    fn test_control_change() {
        assert_eq!(
            decode(&[0xBF, 1, 64]).unwrap(),
            MidiEvent::ControlChange {
                channel: 15,
                controller: 1,
                value: 64
            }
        );
    }

    #[test]
    fn test_short_message_is_malformed() {
        let err = decode(&[0x90, 60]).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedMessage {
                status: 0x90,
                expected: 3,
                actual: 2
            }
        ));
        assert!(decode(&[0xE0]).is_err());
    }

    #[test]
    fn test_long_message_is_malformed() {
        assert!(decode(&[0xB0, 1, 2, 3]).is_err());
    }

    #[test]
    fn test_status_byte_in_data_is_malformed() {
        let err = decode(&[0x90, 0xBC, 0x64]).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedMessage {
                status: 0x90,
                expected: 3,
                actual: 1
            }
        ));
        assert!(decode(&[0xB0, 7, 0xF8]).is_err());
    }

    #[test]
    fn test_empty_message() {
        assert!(matches!(decode(&[]), Err(Error::EmptyMessage)));
    }

    #[test]
    fn test_unsupported_status_is_other() {
        // program change, timing clock, stray data byte
        assert_eq!(decode(&[0xC0, 5]).unwrap(), MidiEvent::Other { status: 0xC0 });
        assert_eq!(decode(&[0xF8]).unwrap(), MidiEvent::Other { status: 0xF8 });
        assert_eq!(decode(&[0x40, 1, 2]).unwrap(), MidiEvent::Other { status: 0x40 });
    }

    #[test]
    fn test_encode_recovers_bytes() {
        for kind in [NOTE_OFF, NOTE_ON, CONTROL_CHANGE, PITCH_BEND] {
            for channel in 0..16 {
                for d1 in 0..=0x7F {
                    for d2 in 0..=0x7F {
                        let bytes = [kind | channel, d1, d2];
                        let event = decode(&bytes).unwrap();
                        assert_eq!(event.encode(), Some(bytes), "{:?}", event);
                    }
                }
            }
        }
    }

    #[test]
    fn test_decode_is_deterministic() {
        let bytes = [0x95, 42, 99];
        assert_eq!(decode(&bytes).unwrap(), decode(&bytes).unwrap());
    }
}
