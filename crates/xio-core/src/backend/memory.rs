//! Growable in-memory backend.
//!
//! The region is addressed by a cursor and a logical end (the high-water
//! mark of all writes). A write past the current capacity doubles the
//! allocation, at least enough to fit the new data. Seeking back after a
//! write and reading again sees everything up to the high-water mark, not
//! just the last write position.

use std::io::{self, SeekFrom};

use super::StreamBackend;

/// Starting allocation for the first write into an empty region.
const INITIAL_REGION_CAPACITY: usize = 64;

/// An in-process growable byte region satisfying the dispatch contract.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Region contents; `data.len()` is the logical end.
    data: Vec<u8>,
    /// Current read/write cursor. May point past the logical end after a
    /// forward seek; the gap is zero-filled by the next write.
    pos: usize,
}

impl MemoryBackend {
    /// An empty region positioned at offset zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A region pre-seeded with `data`, positioned at offset zero.
    pub fn with_contents(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes written so far, up to the high-water mark.
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// Current allocation size of the region.
    pub fn region_capacity(&self) -> usize {
        self.data.capacity()
    }
}

impl StreamBackend for MemoryBackend {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        let n = dst.len().min(self.data.len() - self.pos);
        dst[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        let end = self.pos + src.len();
        if end > self.data.len() {
            if end > self.data.capacity() {
                let mut cap = self.data.capacity().max(INITIAL_REGION_CAPACITY);
                while cap < end {
                    cap *= 2;
                }
                self.data.reserve_exact(cap - self.data.len());
            }
            // Zero-fills any gap left by a seek past the logical end.
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(src);
        self.pos = end;
        Ok(src.len())
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
            SeekFrom::End(delta) => self.data.len() as i64 + delta,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of region",
            ));
        }
        self.pos = target as usize;
        Ok(self.pos as u64)
    }

    fn close(&mut self) -> io::Result<()> {
        self.data = Vec::new();
        self.pos = 0;
        Ok(())
    }
}
