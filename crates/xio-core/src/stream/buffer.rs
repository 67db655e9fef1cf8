//! Buffer manager: the region and cursors behind buffered I/O.
//!
//! The region is a contiguous byte area partitioned by two offsets,
//! `start <= cur <= capacity`. `occupied = cur - start` counts bytes
//! resident in the region: awaiting consumption when the stream is
//! reading, awaiting flush when it is writing. `room = capacity - cur`
//! is free space. The fill/flush loops that move bytes between the region
//! and the backend live on the stream, which owns both sides; this module
//! owns the cursor arithmetic and the configuration rules.

use crate::error::StreamError;

/// Default region size for fully-buffered streams.
pub const DEFAULT_BUF_SIZE: usize = 8192;

/// Buffering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufMode {
    /// Fully buffered: flush when the region is full.
    Full,
    /// Line buffered: rejected at configuration time, kept so callers can
    /// request it and get a typed error back.
    Line,
    /// Unbuffered: zero-capacity region, I/O goes straight to the backend.
    None,
}

/// Who allocated the current region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferOrigin {
    /// Allocated internally; released by the stream at close.
    Owned,
    /// Adopted from the caller via `set_buffer`.
    Supplied,
}

/// Region plus cursors.
///
/// Invariant: `0 <= start <= cur <= data.len()`; unbuffered mode implies
/// `data.len() == 0`.
#[derive(Debug)]
pub struct StreamBuffer {
    data: Vec<u8>,
    start: usize,
    cur: usize,
    mode: BufMode,
    origin: BufferOrigin,
}

impl StreamBuffer {
    /// A fully-buffered region of `DEFAULT_BUF_SIZE`.
    pub fn default_full() -> Self {
        Self {
            data: vec![0u8; DEFAULT_BUF_SIZE],
            start: 0,
            cur: 0,
            mode: BufMode::Full,
            origin: BufferOrigin::Owned,
        }
    }

    /// A zero-capacity region for unbuffered streams.
    pub fn unbuffered() -> Self {
        Self {
            data: Vec::new(),
            start: 0,
            cur: 0,
            mode: BufMode::None,
            origin: BufferOrigin::Owned,
        }
    }

    pub fn mode(&self) -> BufMode {
        self.mode
    }

    pub fn origin(&self) -> BufferOrigin {
        self.origin
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes resident in the region.
    pub fn occupied(&self) -> usize {
        self.cur - self.start
    }

    /// Free space past the cursor.
    pub fn room(&self) -> usize {
        self.data.len() - self.cur
    }

    /// Reconfigure the region.
    ///
    /// An explicit buffer is adopted without ownership; `None` with `Full`
    /// allocates an owned region of `size` (or the default when `size` is
    /// zero); `None` mode releases the region entirely. The previous owned
    /// region is always released first. Any resident bytes are discarded;
    /// the stream flushes before calling this.
    pub fn configure(
        &mut self,
        buf: Option<Vec<u8>>,
        mode: BufMode,
        size: usize,
    ) -> Result<(), StreamError> {
        match (mode, buf) {
            (BufMode::Line, _) => {
                return Err(StreamError::InvalidConfiguration(
                    "line buffering is not supported",
                ));
            }
            (BufMode::None, Some(_)) => {
                return Err(StreamError::InvalidConfiguration(
                    "unbuffered mode cannot adopt a buffer",
                ));
            }
            (BufMode::None, None) => {
                self.data = Vec::new();
                self.origin = BufferOrigin::Owned;
            }
            (BufMode::Full, Some(region)) => {
                if region.is_empty() {
                    return Err(StreamError::InvalidConfiguration(
                        "explicit buffer must have non-zero length",
                    ));
                }
                self.data = region;
                self.origin = BufferOrigin::Supplied;
            }
            (BufMode::Full, None) => {
                let cap = if size == 0 { DEFAULT_BUF_SIZE } else { size };
                self.data = vec![0u8; cap];
                self.origin = BufferOrigin::Owned;
            }
        }
        self.mode = mode;
        self.start = 0;
        self.cur = 0;
        Ok(())
    }

    /// Release the region, leaving a zero-capacity buffer behind.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.start = 0;
        self.cur = 0;
    }

    /// Discard resident bytes.
    pub fn reset(&mut self) {
        self.start = 0;
        self.cur = 0;
    }

    // -----------------------------------------------------------------------
    // Read side: consume from [start, cur), fill at [cur, capacity)
    // -----------------------------------------------------------------------

    /// Copy resident bytes into `dst`, advancing `start`. Returns the
    /// number copied. Cursors rewind to zero once drained.
    pub fn take(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.occupied());
        dst[..n].copy_from_slice(&self.data[self.start..self.start + n]);
        self.start += n;
        if self.start == self.cur {
            self.start = 0;
            self.cur = 0;
        }
        n
    }

    /// Free region past the cursor, for the backend to fill.
    pub fn fill_region(&mut self) -> &mut [u8] {
        &mut self.data[self.cur..]
    }

    /// Account for `n` bytes the backend deposited in the fill region.
    pub fn advance_fill(&mut self, n: usize) {
        debug_assert!(self.cur + n <= self.data.len());
        self.cur += n;
    }

    // -----------------------------------------------------------------------
    // Write side: accumulate at [cur, capacity), flush from [start, cur)
    // -----------------------------------------------------------------------

    /// Copy from `src` into free space, advancing `cur`. Returns the
    /// number accepted (zero when full).
    pub fn append(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.room());
        self.data[self.cur..self.cur + n].copy_from_slice(&src[..n]);
        self.cur += n;
        n
    }

    /// Resident bytes awaiting flush.
    pub fn pending(&self) -> &[u8] {
        &self.data[self.start..self.cur]
    }

    /// Account for `n` pending bytes the backend accepted. Cursors rewind
    /// to zero once everything pending is out.
    pub fn consume_flushed(&mut self, n: usize) {
        debug_assert!(self.start + n <= self.cur);
        self.start += n;
        if self.start == self.cur {
            self.start = 0;
            self.cur = 0;
        }
    }
}
