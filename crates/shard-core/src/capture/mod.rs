//! Process-wide buffer for engine output.
//!
//! The engine adapter appends every line it sees; the orchestrator takes a
//! snapshot and clears the buffer once per batch so that each batch's uploads
//! carry exactly the output produced while that batch ran.
//!
//! Snapshot-and-reset is only meaningful while a single batch executes at a
//! time. [`CaptureBuffer::single_flight`] hands out the guard the orchestrator
//! holds for the whole execute → normalize → snapshot window.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shard_model::CapturedOutput;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

#[derive(Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Inner>>,
    flight: Arc<AsyncMutex<()>>,
}

#[derive(Default)]
struct Inner {
    text: String,
    /// Maximum retained bytes, `0` for unbounded.
    limit: usize,
    dropped: usize,
}

impl CaptureBuffer {
    /// Unbounded buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer retaining at most `limit` bytes; the oldest output is dropped first.
    pub fn with_limit(limit: usize) -> Self {
        let buf = Self::default();
        buf.lock().limit = limit;
        buf
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append raw text.
    pub fn write(&self, text: &str) {
        let mut inner = self.lock();
        inner.text.push_str(text);
        inner.truncate_front();
    }

    /// Append one line, adding the trailing newline.
    pub fn write_line(&self, line: &str) {
        let mut inner = self.lock();
        inner.text.push_str(line);
        inner.text.push('\n');
        inner.truncate_front();
    }

    /// Copy of everything buffered since the last reset.
    pub fn snapshot(&self) -> CapturedOutput {
        CapturedOutput::new(self.lock().text.clone())
    }

    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.text.clear();
        inner.dropped = 0;
    }

    /// Snapshot and reset under one lock acquisition.
    pub fn take(&self) -> CapturedOutput {
        let mut inner = self.lock();
        if inner.dropped > 0 {
            trace!(target: "shard.core.capture", dropped = inner.dropped, "capture limit reached; oldest output dropped");
        }
        inner.dropped = 0;
        CapturedOutput::new(std::mem::take(&mut inner.text))
    }

    pub fn len(&self) -> usize {
        self.lock().text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().text.is_empty()
    }

    /// Wait until no other batch is using this buffer, then hold it until the guard drops.
    pub async fn single_flight(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.flight).lock_owned().await
    }
}

impl Inner {
    fn truncate_front(&mut self) {
        if self.limit == 0 || self.text.len() <= self.limit {
            return;
        }
        let mut cut = self.text.len() - self.limit;
        while !self.text.is_char_boundary(cut) {
            cut += 1;
        }
        self.text.drain(..cut);
        self.dropped += cut;
    }
}
