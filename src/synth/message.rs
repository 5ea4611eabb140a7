#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer};

use crate::Result;
#[cfg(feature = "rtrb")]
use crate::error::Error;

use super::voice::NoteId;

/// Commands sent from control threads to the audio thread.
///
/// Everything that claims or returns a voice travels through here so the
/// pool is only ever mutated at the start of a block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn {
        id: NoteId,
        velocity: u8,
        /// Explicit pitch in Hz; `None` derives it from `id` as a MIDI note.
        frequency: Option<f64>,
    },
    NoteOff {
        id: NoteId,
    },
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

pub trait MessageSender {
    /// Queue a message; fails with `QueueFull` instead of blocking.
    fn push(&mut self, msg: SynthMessage) -> Result<()>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

#[cfg(feature = "rtrb")]
impl MessageSender for Producer<SynthMessage> {
    fn push(&mut self, msg: SynthMessage) -> Result<()> {
        Producer::push(self, msg).map_err(|_| Error::QueueFull)
    }
}

/// Receiver for a synth driven only through its direct methods.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<SynthMessage> {
        None
    }
}
