use std::{
    collections::HashMap,
    mem,
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};

/// One full pass over the catalog, tagged with the ingest time.
///
/// A metric maps to `None` where its read or decoding failed, so a failure
/// shows up as an explicit «no value» rather than a stale number.
#[must_use]
#[derive(Clone, Debug)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    pub values: HashMap<String, Option<f64>>,
}

/// Samples awaiting aggregation, shared between the pollers and the
/// aggregation scheduler.
///
/// Grows without bound between drains: polling runs on seconds, draining on
/// minutes, so the backlog stays small in practice.
#[must_use]
#[derive(Default)]
pub struct SampleBuffer(Mutex<Vec<RawSample>>);

impl SampleBuffer {
    pub fn append(&self, sample: RawSample) {
        self.lock().push(sample);
    }

    /// Swap the entire contents for an empty buffer in one indivisible step.
    ///
    /// Every appended sample ends up in exactly one drain — never split
    /// across two, never duplicated. Draining an empty buffer is not an
    /// error and yields an empty batch.
    pub fn take_all(&self) -> Vec<RawSample> {
        mem::take(&mut *self.lock())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RawSample>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
