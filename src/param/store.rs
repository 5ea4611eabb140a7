use std::sync::Arc;

use crate::{error::Error, Result};

use super::cell::ParamCell;

/// When a voice reads a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Sampled once at note-on and held for the note's lifetime.
    Latched,
    /// Re-read every block (or every sample on per-sample modulation paths).
    Continuous,
}

/// Index of a parameter inside the store that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(usize);

impl ParamId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct Param {
    name: String,
    min: f64,
    max: f64,
    default: f64,
    kind: ParamKind,
    value: ParamCell,
}

impl Param {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn default_value(&self) -> f64 {
        self.default
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value.get()
    }

    /// Clamp into `[min, max]` and store. NaN is ignored.
    #[inline]
    pub fn set(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.value.get();
        }
        let clamped = value.clamp(self.min, self.max);
        self.value.set(clamped);
        clamped
    }

    /// Map 0.0..=1.0 linearly onto `[min, max]`.
    #[inline]
    pub fn set_normalized(&self, unit: f64) -> f64 {
        self.set(self.min + unit.clamp(0.0, 1.0) * (self.max - self.min))
    }
}

/// Parameters of one voice.
///
/// Registration (`create`) takes `&mut self`, so the set of names is frozen as
/// soon as the store is wrapped in an `Arc` and handed to another thread.
/// Lookups by name scan a handful of entries; the audio thread resolves
/// [`ParamId`]s at construction and reads through those instead.
#[derive(Debug, Default)]
pub struct ParamStore {
    params: Vec<Param>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter. `default` is clamped into range.
    pub fn create(
        &mut self,
        name: &str,
        default: f64,
        min: f64,
        max: f64,
        kind: ParamKind,
    ) -> Result<ParamId> {
        if self.find(name).is_some() {
            return Err(Error::DuplicateParameter(name.to_string()));
        }
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(Error::InvalidRange {
                name: name.to_string(),
                min,
                max,
            });
        }

        let default = if default.is_nan() { min } else { default.clamp(min, max) };
        self.params.push(Param {
            name: name.to_string(),
            min,
            max,
            default,
            kind,
            value: ParamCell::new(default),
        });

        Ok(ParamId(self.params.len() - 1))
    }

    pub fn id(&self, name: &str) -> Result<ParamId> {
        self.find(name)
            .map(ParamId)
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<f64> {
        Ok(self.param(self.id(name)?).map_or(0.0, Param::value))
    }

    /// Clamp and store; returns the value actually stored.
    pub fn set(&self, name: &str, value: f64) -> Result<f64> {
        let id = self.id(name)?;
        Ok(self.param(id).map_or(value, |p| p.set(value)))
    }

    pub fn param(&self, id: ParamId) -> Option<&Param> {
        self.params.get(id.0)
    }

    pub fn param_named(&self, name: &str) -> Result<&Param> {
        self.find(name)
            .and_then(|index| self.params.get(index))
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))
    }

    /// Realtime read. An id from another store reads as 0.0 rather than panicking.
    #[inline]
    pub fn value(&self, id: ParamId) -> f64 {
        self.params.get(id.0).map_or(0.0, Param::value)
    }

    #[inline]
    pub fn value_f32(&self, id: ParamId) -> f32 {
        self.value(id) as f32
    }

    #[inline]
    pub fn set_by_id(&self, id: ParamId, value: f64) {
        if let Some(param) = self.params.get(id.0) {
            param.set(value);
        }
    }

    /// Restore every parameter to its default.
    pub fn reset(&self) {
        for param in &self.params {
            param.value.set(param.default);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}
