use std::sync::Arc;

use tracing::info;

use crate::{
    config::{EngineConfig, RetriggerPolicy, StealPolicy},
    error::Error,
    graph::VoiceGraph,
    io::converter::note_to_freq,
    param::ParamStore,
    synth::{
        factory::VoiceFactory,
        message::{MessageReceiver, SynthMessage},
        monitor::SynthMonitor,
        voice::{NoteId, Voice, VoiceState},
    },
    Result,
};

/// Stable reference to a slot of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle(usize);

impl VoiceHandle {
    pub fn slot(self) -> usize {
        self.0
    }
}

/// Fixed pool of voices of one concrete graph type.
///
/// Note identifiers map to slot indices (the slot stores its note), idle
/// slots sit on a free list sized to the pool, and every buffer is allocated
/// in `new`. `render` therefore never allocates, locks or logs.
pub struct PolySynth<G: VoiceGraph, R: MessageReceiver> {
    voices: Vec<Voice<G>>,
    free_list: Vec<usize>,
    rx: R,
    scratch_l: Vec<f32>,
    scratch_r: Vec<f32>,
    mix_l: Vec<f32>,
    mix_r: Vec<f32>,
    frame_counter: u64,
    next_age: u64,
    max_block: usize,
    steal_policy: StealPolicy,
    retrigger_policy: RetriggerPolicy,
    reference_pitch: f64,
    threshold: f32,
    monitor: Arc<SynthMonitor>,
}

impl<G: VoiceGraph, R: MessageReceiver> PolySynth<G, R> {
    pub fn new<F>(config: &EngineConfig, factory: F, rx: R) -> Result<Self>
    where
        F: VoiceFactory<Voice = G>,
    {
        config.validate()?;

        let voices = (0..config.max_voices)
            .map(|_| {
                factory
                    .create_voice(config.sample_rate)
                    .map(|graph| Voice::new(graph, config.sample_rate))
            })
            .collect::<Result<Vec<_>>>()?;

        // popped from the back, so slot 0 is handed out first
        let free_list = (0..config.max_voices).rev().collect();

        info!(
            voices = config.max_voices,
            sample_rate = config.sample_rate,
            block = config.max_block_size,
            steal = ?config.steal_policy,
            retrigger = ?config.retrigger_policy,
            "voice pool ready"
        );

        Ok(Self {
            voices,
            free_list,
            rx,
            scratch_l: vec![0.0; config.max_block_size],
            scratch_r: vec![0.0; config.max_block_size],
            mix_l: vec![0.0; config.max_block_size],
            mix_r: vec![0.0; config.max_block_size],
            frame_counter: 0,
            next_age: 0,
            max_block: config.max_block_size,
            steal_policy: config.steal_policy,
            retrigger_policy: config.retrigger_policy,
            reference_pitch: config.reference_pitch,
            threshold: config.follower_threshold,
            monitor: Arc::new(SynthMonitor::new(config.max_voices)),
        })
    }

    /// Start (or retrigger) a note.
    ///
    /// Without an explicit `frequency` the identifier is read as a MIDI note
    /// number against the configured reference pitch.
    pub fn note_on(
        &mut self,
        id: NoteId,
        velocity: u8,
        frequency: Option<f64>,
    ) -> Result<VoiceHandle> {
        let frequency = frequency.unwrap_or_else(|| note_to_freq(id, self.reference_pitch));

        let slot = match self.find_voice(id) {
            Some(slot) => {
                let ignore = self.retrigger_policy == RetriggerPolicy::Ignore
                    && self.voices[slot].state() == VoiceState::Active;
                if ignore {
                    return Ok(VoiceHandle(slot));
                }
                slot
            }
            None => match self.free_list.pop() {
                Some(slot) => slot,
                None => match self.steal_policy {
                    StealPolicy::StealOldest => self.oldest_voice().ok_or(Error::PoolExhausted)?,
                    StealPolicy::Reject => {
                        self.monitor.note_rejected();
                        return Err(Error::PoolExhausted);
                    }
                },
            },
        };

        let age = self.next_age;
        self.next_age += 1;
        self.voices[slot].start(id, velocity, frequency, age);
        self.monitor.set_current_voice(slot);
        self.publish(slot);

        Ok(VoiceHandle(slot))
    }

    /// Release the voice playing `id`. It keeps its slot until it goes silent.
    pub fn note_off(&mut self, id: NoteId) {
        if let Some(slot) = self.find_voice(id) {
            self.voices[slot].release();
            self.publish(slot);
        }
    }

    pub fn all_notes_off(&mut self) {
        for slot in 0..self.voices.len() {
            self.voices[slot].release();
            self.publish(slot);
        }
    }

    /// Add the mix of every sounding voice into `left` and `right`.
    ///
    /// Queued commands are applied first. Buffers longer than the configured
    /// block size are rendered in pieces; if the two channels differ in
    /// length only the common prefix is written.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.drain_messages();

        let frames = left.len().min(right.len());
        let mut offset = 0;
        while offset < frames {
            let n = (frames - offset).min(self.max_block);
            self.render_chunk(
                &mut left[offset..offset + n],
                &mut right[offset..offset + n],
            );
            offset += n;
        }

        self.monitor.add_frames(frames as u64);
        for slot in 0..self.voices.len() {
            self.publish(slot);
        }
    }

    /// Overwrite an interleaved host buffer with the mix.
    ///
    /// Channel 0 gets the left mix, channel 1 the right; further channels
    /// are silent and a mono buffer gets the average of both.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }

        let mut mix_l = std::mem::take(&mut self.mix_l);
        let mut mix_r = std::mem::take(&mut self.mix_r);

        for chunk in data.chunks_mut(self.max_block * channels) {
            let frames = chunk.len() / channels;
            let left = &mut mix_l[..frames];
            let right = &mut mix_r[..frames];
            left.fill(0.0);
            right.fill(0.0);

            self.render(left, right);

            chunk.fill(0.0);
            for (i, frame) in chunk.chunks_exact_mut(channels).enumerate() {
                if channels == 1 {
                    frame[0] = 0.5 * (left[i] + right[i]);
                } else {
                    frame[0] = left[i];
                    frame[1] = right[i];
                }
            }
        }

        self.mix_l = mix_l;
        self.mix_r = mix_r;
    }

    pub fn voice(&self, slot: usize) -> Option<&Voice<G>> {
        self.voices.get(slot)
    }

    pub fn voice_mut(&mut self, slot: usize) -> Option<&mut Voice<G>> {
        self.voices.get_mut(slot)
    }

    pub fn voice_params(&self, slot: usize) -> Option<Arc<ParamStore>> {
        self.voices.get(slot).map(|v| Arc::clone(v.graph().params()))
    }

    /// Parameter stores of every slot, in slot order, for control threads.
    pub fn param_handles(&self) -> Vec<Arc<ParamStore>> {
        self.voices
            .iter()
            .map(|v| Arc::clone(v.graph().params()))
            .collect()
    }

    /// The most recently started voice, while it is still sounding.
    pub fn current_voice(&self) -> Option<VoiceHandle> {
        self.monitor.current_voice().map(VoiceHandle)
    }

    /// Slot currently mapped to `id`.
    pub fn voice_for(&self, id: NoteId) -> Option<VoiceHandle> {
        self.find_voice(id).map(VoiceHandle)
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len() - self.free_list.len()
    }

    pub fn max_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame_counter
    }

    pub fn monitor(&self) -> Arc<SynthMonitor> {
        Arc::clone(&self.monitor)
    }

    fn drain_messages(&mut self) {
        while let Some(msg) = self.rx.pop() {
            match msg {
                SynthMessage::NoteOn {
                    id,
                    velocity,
                    frequency,
                } => {
                    // rejections are counted by the monitor
                    let _ = self.note_on(id, velocity, frequency);
                }
                SynthMessage::NoteOff { id } => self.note_off(id),
                SynthMessage::AllNotesOff => self.all_notes_off(),
            }
        }
    }

    fn render_chunk(&mut self, left: &mut [f32], right: &mut [f32]) {
        let n = left.len();

        for slot in 0..self.voices.len() {
            let voice = &mut self.voices[slot];
            if voice.is_free() {
                continue;
            }

            let scratch_l = &mut self.scratch_l[..n];
            let scratch_r = &mut self.scratch_r[..n];
            scratch_l.fill(0.0);
            scratch_r.fill(0.0);

            let freed = voice.render(scratch_l, scratch_r, self.threshold);

            let finite = scratch_l.iter().chain(scratch_r.iter()).all(|s| s.is_finite());
            if finite {
                for (out, s) in left.iter_mut().zip(scratch_l.iter()) {
                    *out += s;
                }
                for (out, s) in right.iter_mut().zip(scratch_r.iter()) {
                    *out += s;
                }
            } else {
                // the voice sits this block out
                voice.graph_mut().reset_state();
                self.monitor.block_faulted();
            }

            if freed {
                self.free_list.push(slot);
            }
        }

        self.frame_counter += n as u64;
    }

    fn find_voice(&self, id: NoteId) -> Option<usize> {
        self.voices
            .iter()
            .position(|v| v.note() == Some(id) && v.is_active())
    }

    /// Oldest releasing voice, or failing that the oldest active one.
    fn oldest_voice(&self) -> Option<usize> {
        let oldest_in = |state: VoiceState| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| v.state() == state)
                .min_by_key(|(_, v)| v.age())
                .map(|(slot, _)| slot)
        };

        oldest_in(VoiceState::Releasing).or_else(|| oldest_in(VoiceState::Active))
    }

    fn publish(&self, slot: usize) {
        if let Some(voice) = self.voices.get(slot) {
            let graph = voice.graph();
            self.monitor.publish(
                slot,
                voice.state(),
                voice.note(),
                graph.frequency(),
                graph.amplitude(),
                graph.follower_level(),
            );
        }
    }
}
