// Purpose: Voice management, polyphony, MIDI handling
// This layer sits above the voice graphs and manages the pool of voices

pub mod dispatcher;
pub mod factory;
pub mod glide;
pub mod message;
pub mod monitor;
pub mod poly;
pub mod voice;

pub use dispatcher::{ControlMap, Dispatcher};
pub use factory::VoiceFactory;
pub use glide::GlideController;
pub use message::{MessageReceiver, MessageSender, SynthMessage};
pub use monitor::{SynthMonitor, VoiceSnapshot};
pub use poly::{PolySynth, VoiceHandle};
pub use voice::{NoteId, Voice, VoiceState};
