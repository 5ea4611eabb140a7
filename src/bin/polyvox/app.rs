//! Audio stream setup and the control loop that performs the score.

use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use polyvox::{
    graph::VoiceGraph,
    synth::{Dispatcher, PolySynth, SynthMessage, VoiceFactory},
    voices::{SineEnv, Theremin},
    EngineConfig, InstrumentKind,
};
use rtrb::{Producer, RingBuffer};
use tracing::{error, info, warn};

use super::score::{self, Cue};

/// Control loop rate for glide updates.
const FRAME: Duration = Duration::from_millis(16);

pub struct App {
    config: EngineConfig,
}

impl App {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Open the default output device and play until the score ends.
    pub fn run(mut self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        self.config.sample_rate = stream_config.sample_rate().0 as f32;
        let channels = stream_config.channels() as usize;
        let stream_config: cpal::StreamConfig = stream_config.into();

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = self.config.sample_rate,
            channels,
            instrument = ?self.config.instrument,
            "starting"
        );

        match self.config.instrument {
            InstrumentKind::SineEnv => {
                self.perform(&device, &stream_config, channels, SineEnv::new)
            }
            InstrumentKind::Theremin => {
                self.perform(&device, &stream_config, channels, Theremin::new)
            }
        }
    }

    fn perform<F>(
        &self,
        device: &cpal::Device,
        stream_config: &cpal::StreamConfig,
        channels: usize,
        factory: F,
    ) -> EyreResult<()>
    where
        F: VoiceFactory,
        F::Voice: VoiceGraph + 'static,
    {
        let (tx, rx) = RingBuffer::<SynthMessage>::new(self.config.queue_capacity);
        let mut synth = PolySynth::new(&self.config, factory, rx)?;
        let monitor = synth.monitor();
        let mut dispatcher = Dispatcher::new(&self.config, tx, synth.param_handles(), synth.monitor());

        let stream = device.build_output_stream(
            stream_config,
            move |data: &mut [f32], _| synth.render_interleaved(data, channels),
            |err| error!(%err, "audio stream error"),
            None,
        )?;
        stream.play()?;

        match self.config.instrument {
            InstrumentKind::SineEnv => play_score(&mut dispatcher, &score::keyboard(), 1.0)?,
            InstrumentKind::Theremin => {
                dispatcher.start_drone(127)?;
                play_score(&mut dispatcher, &score::melody(), 1.5)?;
                dispatcher.all_notes_off()?;
                // let the drone release
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        info!(
            frames = monitor.frames_rendered(),
            rejected = monitor.rejected_notes(),
            faulted = monitor.faulted_blocks(),
            "done"
        );
        Ok(())
    }
}

/// Feed `cues` to the dispatcher in real time, ticking the glide between them.
fn play_score(
    dispatcher: &mut Dispatcher<Producer<SynthMessage>>,
    cues: &[Cue],
    tail: f64,
) -> EyreResult<()> {
    let start = Instant::now();
    let end = score::duration(cues, tail);
    let mut pending = cues.iter().peekable();
    let mut last_tick = start;

    loop {
        let now = Instant::now();
        let elapsed = now.duration_since(start).as_secs_f64();
        if elapsed >= end {
            return Ok(());
        }

        while let Some((at, bytes)) = pending.next_if(|cue| cue.0 <= elapsed) {
            if let Err(err) = dispatcher.handle_midi(*at, bytes) {
                warn!(%err, "cue dropped");
            }
        }

        dispatcher.update(now.duration_since(last_tick).as_secs_f64())?;
        last_tick = now;

        let voices = dispatcher.monitor().active_voices();
        if let Some(voice) = voices.first() {
            tracing::trace!(
                sounding = voices.len(),
                frequency = voice.frequency,
                level = voice.level,
                "voices"
            );
        }

        std::thread::sleep(FRAME);
    }
}
