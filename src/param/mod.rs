//! Named, bounded control values owned by one voice.
//!
//! A [`ParamStore`] is built once per voice (all names registered up front),
//! then shared as `Arc<ParamStore>` between the voice on the audio thread and
//! whatever control threads write to it. Every value lives in its own atomic
//! cell, so writers never block the audio thread.

mod cell;
mod store;

pub use cell::ParamCell;
pub use store::{Param, ParamId, ParamKind, ParamStore};
