//! Backend providers: the byte-transport side of a stream.
//!
//! A backend exposes exactly four operations over its underlying medium.
//! The stream core never sees the medium itself; it only drives this
//! contract. One backend is bound per stream at construction and never
//! replaced.

use std::io::{self, Read, Seek, SeekFrom, Write};

pub mod file;
pub mod memory;
pub mod standard;

pub use file::{FileBackend, OpenFlags, parse_mode};
pub use memory::MemoryBackend;
pub use standard::StandardBackend;

/// The dispatch contract every backend provider satisfies.
///
/// Return-value conventions, used uniformly by the buffer engine:
/// - `read`: `Ok(0)` means clean end-of-stream, `Ok(n)` with `n <= dst.len()`
///   means partial or complete progress, `Err` means fault.
/// - `write`: `Ok(m)` with `m <= src.len()` reports accepted bytes; the
///   caller keeps retrying while progress is positive. `Ok(0)` and `Err`
///   both terminate the flush as a fault.
/// - `seek`: returns the resulting absolute offset. Backends that cannot
///   reposition return an error of kind [`io::ErrorKind::Unsupported`].
/// - `close`: releases backend-owned resources; invoked at most once per
///   backend by the owning stream.
pub trait StreamBackend {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize>;
    fn write(&mut self, src: &[u8]) -> io::Result<usize>;
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;
    fn close(&mut self) -> io::Result<()>;
}

/// Adapter binding any owned `Read + Write + Seek` handle to the dispatch
/// contract.
///
/// This is the generic constructor path for callers that already hold an
/// open handle (a socket-like pair, a cursor, a file wrapper) and do not
/// need a dedicated backend type.
pub struct HandleBackend<T> {
    inner: T,
}

impl<T> HandleBackend<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Recover the wrapped handle.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Write + Seek> StreamBackend for HandleBackend<T> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        self.inner.read(dst)
    }

    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        self.inner.write(src)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_handle_backend_delegates() {
        let mut backend = HandleBackend::new(Cursor::new(Vec::new()));
        assert_eq!(backend.write(b"abc").unwrap(), 3);
        assert_eq!(backend.seek(SeekFrom::Start(1)).unwrap(), 1);
        let mut out = [0u8; 2];
        assert_eq!(backend.read(&mut out).unwrap(), 2);
        assert_eq!(&out, b"bc");
        assert!(backend.close().is_ok());
    }

    #[test]
    fn test_handle_backend_read_at_end() {
        let mut backend = HandleBackend::new(Cursor::new(b"x".to_vec()));
        let mut out = [0u8; 4];
        assert_eq!(backend.read(&mut out).unwrap(), 1);
        assert_eq!(backend.read(&mut out).unwrap(), 0);
    }
}
