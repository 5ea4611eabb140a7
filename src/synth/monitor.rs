//! Read-only view of the pool for visualization and diagnostics.
//!
//! The audio thread publishes each slot's state after every render call with
//! relaxed atomic stores; readers on any thread get a slightly stale but
//! never torn picture and can never block the renderer.

use std::sync::atomic::{AtomicI64, AtomicU64, AtomicU8, AtomicUsize, Ordering};

use atomic_float::AtomicF32;

use super::voice::{NoteId, VoiceState};

const NO_NOTE: i64 = i64::MIN;
const NO_VOICE: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSnapshot {
    pub slot: usize,
    pub state: VoiceState,
    pub note: Option<NoteId>,
    pub frequency: f32,
    pub amplitude: f32,
    /// Envelope-follower level.
    pub level: f32,
}

#[derive(Debug)]
struct SlotMonitor {
    state: AtomicU8,
    note: AtomicI64,
    frequency: AtomicF32,
    amplitude: AtomicF32,
    level: AtomicF32,
}

impl SlotMonitor {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(encode_state(VoiceState::Idle)),
            note: AtomicI64::new(NO_NOTE),
            frequency: AtomicF32::new(0.0),
            amplitude: AtomicF32::new(0.0),
            level: AtomicF32::new(0.0),
        }
    }
}

#[derive(Debug)]
pub struct SynthMonitor {
    slots: Vec<SlotMonitor>,
    current_voice: AtomicUsize,
    rejected_notes: AtomicU64,
    faulted_blocks: AtomicU64,
    frames_rendered: AtomicU64,
}

impl SynthMonitor {
    pub fn new(voices: usize) -> Self {
        Self {
            slots: (0..voices).map(|_| SlotMonitor::new()).collect(),
            current_voice: AtomicUsize::new(NO_VOICE),
            rejected_notes: AtomicU64::new(0),
            faulted_blocks: AtomicU64::new(0),
            frames_rendered: AtomicU64::new(0),
        }
    }

    pub fn voices(&self) -> usize {
        self.slots.len()
    }

    pub fn snapshot(&self, slot: usize) -> Option<VoiceSnapshot> {
        let m = self.slots.get(slot)?;
        let note = m.note.load(Ordering::Relaxed);
        Some(VoiceSnapshot {
            slot,
            state: decode_state(m.state.load(Ordering::Relaxed)),
            note: (note != NO_NOTE).then_some(note as NoteId),
            frequency: m.frequency.load(Ordering::Relaxed),
            amplitude: m.amplitude.load(Ordering::Relaxed),
            level: m.level.load(Ordering::Relaxed),
        })
    }

    /// Snapshots of every slot that is not idle.
    pub fn active_voices(&self) -> Vec<VoiceSnapshot> {
        (0..self.slots.len())
            .filter_map(|slot| self.snapshot(slot))
            .filter(|s| s.state != VoiceState::Idle)
            .collect()
    }

    /// Slot of the most recently started voice, if it is still sounding.
    pub fn current_voice(&self) -> Option<usize> {
        let slot = self.current_voice.load(Ordering::Relaxed);
        let snapshot = self.snapshot(slot)?;
        (snapshot.state != VoiceState::Idle).then_some(slot)
    }

    /// Note-ons dropped because the pool was full under the reject policy.
    pub fn rejected_notes(&self) -> u64 {
        self.rejected_notes.load(Ordering::Relaxed)
    }

    /// Voice blocks replaced by silence because they produced non-finite samples.
    pub fn faulted_blocks(&self) -> u64 {
        self.faulted_blocks.load(Ordering::Relaxed)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered.load(Ordering::Relaxed)
    }

    // Writers, audio thread only.

    pub(crate) fn publish(
        &self,
        slot: usize,
        state: VoiceState,
        note: Option<NoteId>,
        frequency: f32,
        amplitude: f32,
        level: f32,
    ) {
        if let Some(m) = self.slots.get(slot) {
            m.state.store(encode_state(state), Ordering::Relaxed);
            m.note
                .store(note.map_or(NO_NOTE, i64::from), Ordering::Relaxed);
            m.frequency.store(frequency, Ordering::Relaxed);
            m.amplitude.store(amplitude, Ordering::Relaxed);
            m.level.store(level, Ordering::Relaxed);
        }
    }

    pub(crate) fn set_current_voice(&self, slot: usize) {
        self.current_voice.store(slot, Ordering::Relaxed);
    }

    pub(crate) fn note_rejected(&self) {
        self.rejected_notes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn block_faulted(&self) {
        self.faulted_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_frames(&self, frames: u64) {
        self.frames_rendered.fetch_add(frames, Ordering::Relaxed);
    }
}

fn encode_state(state: VoiceState) -> u8 {
    match state {
        VoiceState::Idle => 0,
        VoiceState::Active => 1,
        VoiceState::Releasing => 2,
    }
}

fn decode_state(raw: u8) -> VoiceState {
    match raw {
        1 => VoiceState::Active,
        2 => VoiceState::Releasing,
        _ => VoiceState::Idle,
    }
}
