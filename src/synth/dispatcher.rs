//! Control-side entry point: MIDI bytes, note calls, parameter writes.
//!
//! The dispatcher lives on the event thread. Anything that needs a voice is
//! queued for the audio thread; parameter writes go straight to the voices'
//! atomic cells.

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, warn};

use crate::{
    config::{EngineConfig, InstrumentKind},
    error::Error,
    io::{
        converter::{cc_to_unit, note_to_freq, pitch_bend_to_bipolar},
        midi::{self, MidiEvent},
    },
    param::ParamStore,
    synth::{
        glide::{GlideController, DRONE_ID},
        message::{MessageSender, SynthMessage},
        monitor::SynthMonitor,
        voice::NoteId,
    },
    voices::names,
    Result,
};

/// Channel-mode controller that releases every voice.
pub const ALL_NOTES_OFF: u8 = 123;

pub const MODULATION_WHEEL: u8 = 1;
pub const CHANNEL_VOLUME: u8 = 7;
pub const PAN: u8 = 10;

/// Controller number → parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMap {
    bindings: HashMap<u8, String>,
}

impl ControlMap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(mut self, controller: u8, param: &str) -> Self {
        self.bindings.insert(controller, param.to_string());
        self
    }

    pub fn unbind(&mut self, controller: u8) -> Option<String> {
        self.bindings.remove(&controller)
    }

    pub fn get(&self, controller: u8) -> Option<&str> {
        self.bindings.get(&controller).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for ControlMap {
    fn default() -> Self {
        Self::empty()
            .bind(MODULATION_WHEEL, names::VIB_DEPTH)
            .bind(CHANNEL_VOLUME, names::AMPLITUDE)
            .bind(PAN, names::PAN)
    }
}

pub struct Dispatcher<S: MessageSender> {
    tx: S,
    params: Vec<Arc<ParamStore>>,
    monitor: Arc<SynthMonitor>,
    controls: ControlMap,
    channel: Option<u8>,
    bend_range: f64,
    reference_pitch: f64,
    glide: Option<GlideController>,
}

impl<S: MessageSender> Dispatcher<S> {
    /// `params` are the per-slot stores from
    /// [`PolySynth::param_handles`](crate::synth::poly::PolySynth::param_handles).
    pub fn new(
        config: &EngineConfig,
        tx: S,
        params: Vec<Arc<ParamStore>>,
        monitor: Arc<SynthMonitor>,
    ) -> Self {
        let glide = match config.instrument {
            InstrumentKind::Theremin => Some(GlideController::from_config(config)),
            InstrumentKind::SineEnv => None,
        };

        let mut dispatcher = Self {
            tx,
            params,
            monitor,
            controls: ControlMap::empty(),
            channel: config.midi_channel,
            bend_range: config.pitch_bend_range,
            reference_pitch: config.reference_pitch,
            glide,
        };
        dispatcher.set_controls(ControlMap::default());
        dispatcher
    }

    pub fn with_controls(mut self, controls: ControlMap) -> Self {
        self.set_controls(controls);
        self
    }

    /// Install a control map, dropping bindings to parameters the voices lack.
    pub fn set_controls(&mut self, mut controls: ControlMap) {
        let unknown: Vec<(u8, String)> = controls
            .bindings
            .iter()
            .filter(|(_, name)| !self.has_param(name))
            .map(|(cc, name)| (*cc, name.clone()))
            .collect();

        for (controller, name) in unknown {
            warn!(controller, param = %name, "controller bound to unknown parameter, ignoring");
            controls.unbind(controller);
        }
        self.controls = controls;
    }

    pub fn controls(&self) -> &ControlMap {
        &self.controls
    }

    /// Input-driver entry point.
    ///
    /// Malformed messages are logged and dropped; they never stop the stream.
    pub fn handle_midi(&mut self, timestamp: f64, bytes: &[u8]) -> Result<()> {
        let event = match midi::decode(bytes) {
            Ok(event) => event,
            Err(err) => {
                warn!(timestamp, %err, "dropping MIDI message");
                return Ok(());
            }
        };

        debug!(timestamp, ?event, "midi");
        self.handle_event(event)
    }

    pub fn handle_event(&mut self, event: MidiEvent) -> Result<()> {
        if let (Some(wanted), Some(channel)) = (self.channel, event.channel()) {
            if wanted != channel {
                return Ok(());
            }
        }

        match event {
            MidiEvent::NoteOn {
                note, velocity: 0, ..
            }
            | MidiEvent::NoteOff { note, .. } => self.release_note(note),
            MidiEvent::NoteOn { note, velocity, .. } => self.play_note(note, velocity),
            MidiEvent::PitchBend { value, .. } => {
                let semitones = pitch_bend_to_bipolar(value) * self.bend_range;
                self.set_param(names::PITCH_BEND, semitones).map(|_| ())
            }
            MidiEvent::ControlChange {
                controller: ALL_NOTES_OFF,
                ..
            } => self.all_notes_off(),
            MidiEvent::ControlChange {
                controller, value, ..
            } => match self.controls.get(controller) {
                Some(name) => {
                    let unit = cc_to_unit(value);
                    for params in &self.params {
                        params.param_named(name)?.set_normalized(unit);
                    }
                    Ok(())
                }
                None => {
                    debug!(controller, "unbound controller");
                    Ok(())
                }
            },
            MidiEvent::Other { .. } => Ok(()),
        }
    }

    /// Start a voice for `id`, pitched from the reference tuning.
    pub fn note_on(&mut self, id: NoteId, velocity: u8) -> Result<()> {
        self.send(SynthMessage::NoteOn {
            id,
            velocity,
            frequency: None,
        })
    }

    pub fn note_on_with_frequency(&mut self, id: NoteId, velocity: u8, frequency: f64) -> Result<()> {
        self.send(SynthMessage::NoteOn {
            id,
            velocity,
            frequency: Some(frequency),
        })
    }

    pub fn note_off(&mut self, id: NoteId) -> Result<()> {
        self.send(SynthMessage::NoteOff { id })
    }

    pub fn all_notes_off(&mut self) -> Result<()> {
        self.send(SynthMessage::AllNotesOff)
    }

    /// Trigger the held voice a glide instrument sounds through, at its
    /// current frequency.
    pub fn start_drone(&mut self, velocity: u8) -> Result<()> {
        let frequency = self.get_param(names::FREQUENCY)?;
        self.note_on_with_frequency(DRONE_ID, velocity, frequency)
    }

    /// Write `value` (clamped) into every voice; returns the stored value.
    pub fn set_param(&self, name: &str, value: f64) -> Result<f64> {
        let mut stored = None;
        for params in &self.params {
            stored = Some(params.set(name, value)?);
        }
        stored.ok_or_else(|| Error::UnknownParameter(name.to_string()))
    }

    /// Value of `name` on the sounding voice (or the first slot).
    pub fn get_param(&self, name: &str) -> Result<f64> {
        self.live_params()
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))?
            .get(name)
    }

    /// Move a parameter by `delta` from its current value.
    pub fn nudge_param(&self, name: &str, delta: f64) -> Result<f64> {
        let current = self.get_param(name)?;
        self.set_param(name, current + delta)
    }

    /// Advance the glide by one animation frame of `dt` seconds.
    pub fn update(&mut self, dt: f64) -> Result<()> {
        let Some(params) = self.live_params().cloned() else {
            return Ok(());
        };
        match self.glide.as_mut() {
            Some(glide) => glide.update(dt, &params),
            None => Ok(()),
        }
    }

    /// Pointer position on a surface `height` pixels tall. Only glide
    /// instruments respond.
    pub fn pointer_moved(&mut self, x: f32, y: f32, height: f32) -> Result<()> {
        let Some(params) = self.live_params().cloned() else {
            return Ok(());
        };
        match self.glide.as_mut() {
            Some(glide) => glide.pointer_moved(x, y, height, &params)?,
            None => return Ok(()),
        }
        self.rearm_drone(127)
    }

    pub fn monitor(&self) -> &Arc<SynthMonitor> {
        &self.monitor
    }

    pub fn glide(&self) -> Option<&GlideController> {
        self.glide.as_ref()
    }

    fn play_note(&mut self, note: u8, velocity: u8) -> Result<()> {
        if self.glide.is_none() {
            return self.note_on(NoteId::from(note), velocity);
        }

        let target = note_to_freq(i32::from(note), self.reference_pitch);
        let params = self
            .live_params()
            .cloned()
            .ok_or_else(|| Error::UnknownParameter(names::TARGET_FREQUENCY.to_string()))?;
        match self.glide.as_mut() {
            Some(glide) => glide.note_on(target, &params)?,
            None => return Ok(()),
        }
        self.rearm_drone(velocity)
    }

    /// Restart the drone if nothing is sounding, e.g. after an all-notes-off.
    fn rearm_drone(&mut self, velocity: u8) -> Result<()> {
        if self.monitor.current_voice().is_some() {
            return Ok(());
        }
        self.start_drone(velocity)
    }

    fn release_note(&mut self, note: u8) -> Result<()> {
        if self.glide.is_some() {
            // the drone keeps sounding between notes
            return Ok(());
        }
        self.note_off(NoteId::from(note))
    }

    fn send(&mut self, msg: SynthMessage) -> Result<()> {
        debug!(?msg, "queue");
        self.tx.push(msg).inspect_err(|_| {
            warn!(?msg, "command queue full, dropping");
        })
    }

    fn live_params(&self) -> Option<&Arc<ParamStore>> {
        let slot = self.monitor.current_voice().unwrap_or(0);
        self.params.get(slot).or_else(|| self.params.first())
    }

    fn has_param(&self, name: &str) -> bool {
        self.params.first().is_some_and(|p| p.id(name).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::VoiceGraph,
        synth::voice::VoiceState,
        voices::{SineEnv, Theremin},
    };

    #[derive(Default)]
    struct Recorder {
        sent: Vec<SynthMessage>,
        capacity: Option<usize>,
    }

    impl MessageSender for Recorder {
        fn push(&mut self, msg: SynthMessage) -> Result<()> {
            if self.capacity.is_some_and(|cap| self.sent.len() >= cap) {
                return Err(Error::QueueFull);
            }
            self.sent.push(msg);
            Ok(())
        }
    }

    fn keyboard(voices: usize) -> Dispatcher<Recorder> {
        let config = EngineConfig::default().with_max_voices(voices);
        let params = (0..voices)
            .map(|_| Arc::clone(SineEnv::new(48_000.0).unwrap().params()))
            .collect();
        Dispatcher::new(
            &config,
            Recorder::default(),
            params,
            Arc::new(SynthMonitor::new(voices)),
        )
    }

    fn theremin() -> Dispatcher<Recorder> {
        let config = EngineConfig::for_instrument(InstrumentKind::Theremin);
        let params = vec![Arc::clone(Theremin::new(48_000.0).unwrap().params())];
        Dispatcher::new(
            &config,
            Recorder::default(),
            params,
            Arc::new(SynthMonitor::new(1)),
        )
    }

    #[test]
    fn note_bytes_become_commands() {
        let mut d = keyboard(2);
        d.handle_midi(0.0, &[0x90, 60, 100]).unwrap();
        d.handle_midi(0.1, &[0x80, 60, 0]).unwrap();
        d.handle_midi(0.2, &[0x90, 62, 0]).unwrap();

        assert_eq!(
            d.tx.sent,
            vec![
                SynthMessage::NoteOn {
                    id: 60,
                    velocity: 100,
                    frequency: None
                },
                SynthMessage::NoteOff { id: 60 },
                SynthMessage::NoteOff { id: 62 },
            ]
        );
    }

    #[test]
    fn malformed_bytes_are_dropped() {
        let mut d = keyboard(1);
        d.handle_midi(0.0, &[0x90, 60]).unwrap();
        d.handle_midi(0.0, &[]).unwrap();
        assert!(d.tx.sent.is_empty());
    }

    #[test]
    fn other_channels_are_filtered() {
        let config = EngineConfig::default().with_midi_channel(Some(2));
        let params = vec![Arc::clone(SineEnv::new(48_000.0).unwrap().params())];
        let mut d = Dispatcher::new(
            &config,
            Recorder::default(),
            params,
            Arc::new(SynthMonitor::new(1)),
        );
        d.handle_midi(0.0, &[0x90, 60, 100]).unwrap();
        d.handle_midi(0.0, &[0x92, 61, 100]).unwrap();
        assert_eq!(d.tx.sent.len(), 1);
    }

    #[test]
    fn pitch_bend_reaches_every_voice() {
        let mut d = keyboard(3);
        // full up: 0x3FFF
        d.handle_midi(0.0, &[0xE0, 0x7F, 0x7F]).unwrap();
        for params in &d.params {
            let bend = params.get(names::PITCH_BEND).unwrap();
            assert!((bend - 2.0).abs() < 1e-3, "{bend}");
        }
    }

    #[test]
    fn mapped_controllers_scale_to_range() {
        let mut d = keyboard(1);
        d.handle_midi(0.0, &[0xB0, PAN, 0]).unwrap();
        assert_eq!(d.get_param(names::PAN).unwrap(), -1.0);
        d.handle_midi(0.0, &[0xB0, CHANNEL_VOLUME, 127]).unwrap();
        assert_eq!(d.get_param(names::AMPLITUDE).unwrap(), 1.0);
    }

    #[test]
    fn centre_controller_value_centres_pan() {
        let mut d = keyboard(1);
        d.handle_midi(0.0, &[0xB0, PAN, 127]).unwrap();
        d.handle_midi(0.0, &[0xB0, PAN, 64]).unwrap();
        assert_eq!(d.get_param(names::PAN).unwrap(), 0.0);
    }

    #[test]
    fn bindings_to_missing_params_are_dropped() {
        // the sine voice has no vibrato
        let d = keyboard(1);
        assert_eq!(d.controls().get(MODULATION_WHEEL), None);
        assert_eq!(d.controls().get(PAN), Some(names::PAN));

        let t = theremin();
        assert_eq!(t.controls().get(MODULATION_WHEEL), Some(names::VIB_DEPTH));
    }

    #[test]
    fn all_notes_off_controller() {
        let mut d = keyboard(1);
        d.handle_midi(0.0, &[0xB0, ALL_NOTES_OFF, 0]).unwrap();
        assert_eq!(d.tx.sent, vec![SynthMessage::AllNotesOff]);
    }

    #[test]
    fn set_param_clamps_and_rejects_unknown() {
        let d = keyboard(2);
        assert_eq!(d.set_param(names::AMPLITUDE, 5.0).unwrap(), 1.0);
        assert!(matches!(
            d.set_param("cutoff", 1.0),
            Err(Error::UnknownParameter(_))
        ));
        assert_eq!(d.nudge_param(names::AMPLITUDE, -0.25).unwrap(), 0.75);
    }

    #[test]
    fn full_queue_surfaces() {
        let mut d = keyboard(1);
        d.tx.capacity = Some(0);
        assert!(matches!(d.note_on(60, 100), Err(Error::QueueFull)));
    }

    #[test]
    fn theremin_notes_set_the_glide_target() {
        let mut d = theremin();
        // the drone is already sounding
        d.monitor.publish(0, VoiceState::Active, Some(DRONE_ID), 60.0, 0.3, 0.1);
        d.monitor.set_current_voice(0);

        d.handle_midi(0.0, &[0x90, 69, 100]).unwrap();
        d.handle_midi(0.0, &[0x80, 69, 0]).unwrap();
        assert!(d.tx.sent.is_empty());
        assert_eq!(d.get_param(names::TARGET_FREQUENCY).unwrap(), 432.0);
    }

    #[test]
    fn theremin_notes_restart_a_silent_drone() {
        let mut d = theremin();
        d.handle_midi(0.0, &[0x90, 69, 100]).unwrap();
        assert_eq!(d.get_param(names::TARGET_FREQUENCY).unwrap(), 432.0);
        assert_eq!(
            d.tx.sent,
            vec![SynthMessage::NoteOn {
                id: DRONE_ID,
                velocity: 100,
                frequency: Some(60.0)
            }]
        );

        d.pointer_moved(100.0, 50.0, 450.0).unwrap();
        assert_eq!(
            d.tx.sent.last(),
            Some(&SynthMessage::NoteOn {
                id: DRONE_ID,
                velocity: 127,
                frequency: Some(500.0)
            })
        );
    }

    #[test]
    fn update_glides_toward_note() {
        let mut d = theremin();
        d.handle_midi(0.0, &[0x90, 69, 100]).unwrap();
        for _ in 0..120 {
            d.update(1.0 / 60.0).unwrap();
        }
        let f = d.get_param(names::FREQUENCY).unwrap();
        assert!((f - 432.0).abs() < 30.0, "{f}");
    }

    #[test]
    fn keyboard_ignores_pointer() {
        let mut d = keyboard(1);
        d.pointer_moved(100.0, 100.0, 500.0).unwrap();
        d.update(0.1).unwrap();
        assert_eq!(d.get_param(names::FREQUENCY).unwrap(), 60.0);
    }
}
