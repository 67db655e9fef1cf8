//! Open-stream registry.
//!
//! Explicit process-exit bookkeeping: the embedder owns one registry,
//! registers streams it wants flushed and closed at teardown, and calls
//! `shutdown` from its exit path. Nothing here is global; tests can hold
//! as many registries as they like.

use crate::error::StreamError;
use crate::stream::Stream;

/// Handle to a registered stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamId(usize);

/// Owns registered streams until they are released or shut down.
#[derive(Debug, Default)]
pub struct StreamRegistry {
    slots: Vec<Option<Stream>>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams currently registered.
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Take ownership of `stream`, returning its handle. Slots freed by
    /// `release` are reused, so a handle is only valid until its stream
    /// is released.
    pub fn register(&mut self, stream: Stream) -> StreamId {
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            self.slots[index] = Some(stream);
            return StreamId(index);
        }
        self.slots.push(Some(stream));
        StreamId(self.slots.len() - 1)
    }

    /// Borrow a registered stream for I/O.
    pub fn get_mut(&mut self, id: StreamId) -> Option<&mut Stream> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// Remove a stream from the registry without closing it, handing
    /// ownership back to the caller.
    pub fn release(&mut self, id: StreamId) -> Option<Stream> {
        self.slots.get_mut(id.0).and_then(|slot| slot.take())
    }

    /// Flush and close every remaining stream, most recently registered
    /// first. Best-effort: a failing close does not stop the sweep; the
    /// first error is reported once the sweep finishes.
    pub fn shutdown(&mut self) -> Result<(), StreamError> {
        let mut first_error = None;
        for slot in self.slots.iter_mut().rev() {
            if let Some(mut stream) = slot.take() {
                if let Err(e) = stream.close() {
                    first_error.get_or_insert(e);
                }
            }
        }
        self.slots.clear();
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
