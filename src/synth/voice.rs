use crate::graph::{RenderCtx, VoiceGraph};

/// Identifier a note is started and stopped with (a MIDI note number for
/// keyboard instruments, anything for programmatic control).
pub type NoteId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,      // Pooled and silent, available for allocation
    Active,    // Triggered, envelope before its release segment
    Releasing, // Key released, envelope in release phase
}

/// One slot of the pool: a voice graph plus the bookkeeping that maps it to
/// a note.
pub struct Voice<G: VoiceGraph> {
    note: Option<NoteId>,
    velocity: u8,
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    graph: G,
}

impl<G: VoiceGraph> Voice<G> {
    pub fn new(graph: G, sample_rate: f32) -> Self {
        Self {
            note: None,
            velocity: 0,
            state: VoiceState::Idle,
            age: 0,
            sample_rate,
            graph,
        }
    }

    /// Assign the voice to `note` and trigger it.
    ///
    /// Taking over a slot from a different note also clears the graph's
    /// filter and follower memories; retriggering the same note keeps them.
    pub fn start(&mut self, note: NoteId, velocity: u8, frequency_hz: f64, age: u64) {
        if self.note != Some(note) {
            self.graph.reset_state();
        }

        self.note = Some(note);
        self.velocity = velocity;
        self.state = VoiceState::Active;
        self.age = age;

        self.graph.set_frequency(frequency_hz);
        self.graph.note_on(&self.ctx());
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.graph.note_off(&self.ctx());
        }
    }

    /// Add one block of the voice into `left`/`right`.
    ///
    /// Returns `true` if the voice went idle at the end of the block: its
    /// envelope is finished and the follower has dropped below `threshold`.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32], threshold: f32) -> bool {
        if self.state == VoiceState::Idle {
            return false;
        }

        let ctx = self.ctx();
        self.graph.render_block(left, right, &ctx);

        if self.graph.envelope_done() && self.graph.follower_level() < threshold {
            self.free();
            return true;
        }
        false
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Idle;
        self.note = None;
        self.velocity = 0;
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Idle
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn note(&self) -> Option<NoteId> {
        self.note
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    fn ctx(&self) -> RenderCtx {
        RenderCtx::from_velocity(self.sample_rate, self.velocity)
    }
}
