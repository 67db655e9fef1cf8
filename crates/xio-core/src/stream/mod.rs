//! The stream handle: buffered, pushback-capable I/O over one backend.
//!
//! A `Stream` composes a backend (bound once at construction), the buffer
//! manager, the pushback slot, and sticky status flags. All convenience
//! constructors funnel through the generic backend path. The fill/flush
//! loops here implement the byte-accounting contract: a zero-length
//! backend read is end-of-stream, a backend error is a fault, and
//! positive-but-short transfers are partial progress to keep looping on.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::backend::{
    FileBackend, HandleBackend, MemoryBackend, StandardBackend, StreamBackend, parse_mode,
};
use crate::error::StreamError;

pub mod buffer;
pub mod printf;
pub mod pushback;

pub use buffer::{BufMode, BufferOrigin, DEFAULT_BUF_SIZE, StreamBuffer};
pub use printf::FormatArg;
pub use pushback::{PUSHBACK_CAPACITY, Pushback};

/// Sticky status indicators, cleared only by `clear_status` or a rewind.
#[derive(Debug, Clone, Copy, Default)]
struct StreamFlags {
    eof: bool,
    error: bool,
}

/// Which way the buffer region is currently being used. The region holds
/// either read-ahead or pending output, never both; switching direction
/// flushes or discards as appropriate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Idle,
    Reading,
    Writing,
}

/// A buffered stream over a single backend provider.
pub struct Stream {
    /// `None` once closed; every operation afterwards reports `Closed`.
    backend: Option<Box<dyn StreamBackend>>,
    buffer: StreamBuffer,
    pushback: Pushback,
    flags: StreamFlags,
    dir: Direction,
    readable: bool,
    writable: bool,
}

impl Stream {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    fn with_access(backend: Box<dyn StreamBackend>, readable: bool, writable: bool) -> Self {
        Self {
            backend: Some(backend),
            buffer: StreamBuffer::default_full(),
            pushback: Pushback::new(),
            flags: StreamFlags::default(),
            dir: Direction::Idle,
            readable,
            writable,
        }
    }

    /// The generic constructor: adopt any backend, readable and writable,
    /// fully buffered with the default region size.
    pub fn from_backend(backend: Box<dyn StreamBackend>) -> Self {
        Self::with_access(backend, true, true)
    }

    /// Open a native file with a stdio mode string (`"r"`, `"w+"`, ...).
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, StreamError> {
        let flags = parse_mode(mode).ok_or(StreamError::InvalidConfiguration(
            "unrecognized open mode string",
        ))?;
        let backend = FileBackend::open(path.as_ref(), &flags).map_err(StreamError::Open)?;
        Ok(Self::with_access(
            Box::new(backend),
            flags.readable,
            flags.writable,
        ))
    }

    /// Adopt an already-open native file handle.
    pub fn from_file(file: File) -> Self {
        Self::from_backend(Box::new(FileBackend::from_file(file)))
    }

    /// Adopt any owned `Read + Write + Seek` handle.
    pub fn from_handle<T: Read + Write + Seek + 'static>(handle: T) -> Self {
        Self::from_backend(Box::new(HandleBackend::new(handle)))
    }

    /// A stream over a fresh in-memory growable region.
    pub fn memory() -> Self {
        Self::from_backend(Box::new(MemoryBackend::new()))
    }

    /// A stream over an in-memory region pre-seeded with `contents`,
    /// positioned at the start.
    pub fn memory_with_contents(contents: Vec<u8>) -> Self {
        Self::from_backend(Box::new(MemoryBackend::with_contents(contents)))
    }

    /// Buffered reader over process standard input.
    pub fn stdin() -> Self {
        Self::with_access(Box::new(StandardBackend::stdin()), true, false)
    }

    /// Buffered writer over process standard output.
    pub fn stdout() -> Self {
        Self::with_access(Box::new(StandardBackend::stdout()), false, true)
    }

    /// Unbuffered writer over process standard error.
    pub fn stderr() -> Self {
        let mut stream = Self::with_access(Box::new(StandardBackend::stderr()), false, true);
        stream.buffer = StreamBuffer::unbuffered();
        stream
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Sticky end-of-stream indicator.
    pub fn eof(&self) -> bool {
        self.flags.eof
    }

    /// Sticky error indicator.
    pub fn has_error(&self) -> bool {
        self.flags.error
    }

    /// Clear both sticky indicators.
    pub fn clear_status(&mut self) {
        self.flags = StreamFlags::default();
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn buffer_mode(&self) -> BufMode {
        self.buffer.mode()
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Bytes resident in the buffer region (read-ahead or pending output).
    pub fn pending_bytes(&self) -> usize {
        self.buffer.occupied()
    }

    // -----------------------------------------------------------------------
    // Buffering control
    // -----------------------------------------------------------------------

    /// Reconfigure buffering (setvbuf analogue).
    ///
    /// `Some(region)` adopts a caller-supplied buffer (its length is the
    /// capacity, ownership stays with the caller conceptually); `None`
    /// with `Full` allocates an owned region of `size` or the default.
    /// Pending output is flushed and read-ahead discarded first.
    pub fn set_buffer(
        &mut self,
        buf: Option<Vec<u8>>,
        mode: BufMode,
        size: usize,
    ) -> Result<(), StreamError> {
        if self.backend.is_none() {
            return Err(StreamError::Closed);
        }
        if self.dir == Direction::Writing {
            self.flush_pending()?;
        }
        self.buffer.configure(buf, mode, size)?;
        self.dir = Direction::Idle;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Fill / flush engine
    // -----------------------------------------------------------------------

    /// Fill the read buffer from the backend until it is full, the stream
    /// ends, or a fault occurs. Lazy: called only on a read miss.
    fn fill(&mut self) -> Result<(), StreamError> {
        while self.buffer.room() > 0 && !self.flags.eof {
            let Some(backend) = self.backend.as_mut() else {
                return Err(StreamError::Closed);
            };
            match backend.read(self.buffer.fill_region()) {
                Ok(0) => self.flags.eof = true,
                Ok(n) => self.buffer.advance_fill(n),
                Err(e) => {
                    self.flags.error = true;
                    return Err(StreamError::ReadFault(e));
                }
            }
        }
        Ok(())
    }

    /// Push all pending output to the backend, retrying while the backend
    /// reports positive progress. Zero-byte acceptance is a write fault.
    fn flush_pending(&mut self) -> Result<(), StreamError> {
        while self.buffer.occupied() > 0 {
            let Some(backend) = self.backend.as_mut() else {
                return Err(StreamError::Closed);
            };
            match backend.write(self.buffer.pending()) {
                Ok(0) => {
                    self.flags.error = true;
                    return Err(StreamError::WriteFault(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "backend accepted no bytes",
                    )));
                }
                Ok(n) => self.buffer.consume_flushed(n),
                Err(e) => {
                    self.flags.error = true;
                    return Err(StreamError::WriteFault(e));
                }
            }
        }
        Ok(())
    }

    /// Flush pending output, if any.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        if self.backend.is_none() {
            return Err(StreamError::Closed);
        }
        if self.dir == Direction::Writing {
            self.flush_pending()?;
        }
        Ok(())
    }

    fn become_reader(&mut self) -> Result<(), StreamError> {
        if self.dir == Direction::Writing {
            self.flush_pending()?;
        }
        self.dir = Direction::Reading;
        Ok(())
    }

    fn become_writer(&mut self) {
        if self.dir == Direction::Reading {
            // Read-ahead is discarded; callers reposition with seek if the
            // dropped bytes matter.
            self.buffer.reset();
            self.pushback.clear();
        }
        self.dir = Direction::Writing;
    }

    // -----------------------------------------------------------------------
    // Read path
    // -----------------------------------------------------------------------

    /// Core read: pushback first, then resident bytes, then fill loops.
    /// Returns bytes delivered plus the terminal status of the attempt.
    fn read_inner(&mut self, dst: &mut [u8]) -> (usize, Result<(), StreamError>) {
        if self.backend.is_none() {
            return (0, Err(StreamError::Closed));
        }
        if !self.readable {
            self.flags.error = true;
            return (0, Err(StreamError::NotReadable));
        }
        if let Err(e) = self.become_reader() {
            return (0, Err(e));
        }

        let want = dst.len();
        let mut copied = 0;

        while copied < want {
            match self.pushback.pop() {
                Some(byte) => {
                    dst[copied] = byte;
                    copied += 1;
                }
                None => break,
            }
        }

        if self.buffer.mode() == BufMode::None {
            // One bounded backend call per request: a short read returns
            // the short count instead of blocking for more.
            if copied < want && !self.flags.eof {
                let Some(backend) = self.backend.as_mut() else {
                    return (copied, Err(StreamError::Closed));
                };
                match backend.read(&mut dst[copied..]) {
                    Ok(0) => self.flags.eof = true,
                    Ok(n) => copied += n,
                    Err(e) => {
                        self.flags.error = true;
                        return (copied, Err(StreamError::ReadFault(e)));
                    }
                }
            }
        } else {
            loop {
                copied += self.buffer.take(&mut dst[copied..]);
                if copied == want || self.flags.eof || self.flags.error {
                    break;
                }
                if let Err(e) = self.fill() {
                    // Serve whatever arrived before the fault.
                    copied += self.buffer.take(&mut dst[copied..]);
                    return (copied, Err(e));
                }
            }
        }

        (copied, Ok(()))
    }

    /// Read up to `dst.len()` bytes. Returns the count delivered; a short
    /// count means end-of-stream, a fault (visible in the sticky flags),
    /// or, unbuffered, a partial backend delivery.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        self.read_inner(dst).0
    }

    /// Block-oriented read (fread analogue): returns the number of *whole*
    /// items of `block` bytes delivered into `dst`.
    pub fn read_items(&mut self, dst: &mut [u8], block: usize, n_items: usize) -> usize {
        let Some(want) = block.checked_mul(n_items) else {
            return 0;
        };
        if want == 0 {
            return 0;
        }
        let want = want.min(dst.len());
        let (copied, _) = self.read_inner(&mut dst[..want]);
        copied / block
    }

    /// Read one byte. `None` on end-of-stream or fault (check the flags).
    pub fn get(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        if self.read(&mut byte) == 1 {
            Some(byte[0])
        } else {
            None
        }
    }

    /// Push a byte back to be replayed before any buffered content, last
    /// pushed first. Clears the sticky EOF indicator.
    pub fn unget(&mut self, byte: u8) -> Result<(), StreamError> {
        if self.backend.is_none() {
            return Err(StreamError::Closed);
        }
        if !self.readable {
            return Err(StreamError::NotReadable);
        }
        self.become_reader()?;
        if !self.pushback.push(byte) {
            return Err(StreamError::PushbackOverflow);
        }
        self.flags.eof = false;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Write path
    // -----------------------------------------------------------------------

    /// Core write: accumulate into the buffer, flushing on overflow.
    /// Returns bytes accepted plus the terminal status of the attempt.
    fn write_inner(&mut self, src: &[u8]) -> (usize, Result<(), StreamError>) {
        if self.backend.is_none() {
            return (0, Err(StreamError::Closed));
        }
        if !self.writable {
            self.flags.error = true;
            return (0, Err(StreamError::NotWritable));
        }
        self.become_writer();

        let mut written = 0;

        if self.buffer.mode() == BufMode::None {
            while written < src.len() {
                let Some(backend) = self.backend.as_mut() else {
                    return (written, Err(StreamError::Closed));
                };
                match backend.write(&src[written..]) {
                    Ok(0) => {
                        self.flags.error = true;
                        return (
                            written,
                            Err(StreamError::WriteFault(io::Error::new(
                                io::ErrorKind::WriteZero,
                                "backend accepted no bytes",
                            ))),
                        );
                    }
                    Ok(n) => written += n,
                    Err(e) => {
                        self.flags.error = true;
                        return (written, Err(StreamError::WriteFault(e)));
                    }
                }
            }
        } else {
            while written < src.len() {
                written += self.buffer.append(&src[written..]);
                if written < src.len() {
                    // Region full mid-request: flush and keep accumulating.
                    if let Err(e) = self.flush_pending() {
                        return (written, Err(e));
                    }
                }
            }
        }

        (written, Ok(()))
    }

    /// Write `src`. Returns the count accepted; a short count means a
    /// fault, visible in the sticky error flag.
    pub fn write(&mut self, src: &[u8]) -> usize {
        self.write_inner(src).0
    }

    /// Block-oriented write (fwrite analogue): returns the number of whole
    /// items of `block` bytes accepted.
    pub fn write_items(&mut self, src: &[u8], block: usize, n_items: usize) -> usize {
        let Some(want) = block.checked_mul(n_items) else {
            return 0;
        };
        if want == 0 {
            return 0;
        }
        let want = want.min(src.len());
        let (written, _) = self.write_inner(&src[..want]);
        written / block
    }

    /// Write all of `src` or report why not.
    pub fn write_all(&mut self, src: &[u8]) -> Result<(), StreamError> {
        let (_, status) = self.write_inner(src);
        status
    }

    /// Write one byte.
    pub fn put(&mut self, byte: u8) -> Result<(), StreamError> {
        self.write_all(&[byte])
    }

    /// Write a string (fputs analogue). Returns the byte count written.
    pub fn put_str(&mut self, s: &str) -> Result<usize, StreamError> {
        self.write_all(s.as_bytes())?;
        Ok(s.len())
    }

    // -----------------------------------------------------------------------
    // Positioning
    // -----------------------------------------------------------------------

    fn backend_seek(&mut self, pos: SeekFrom) -> Result<u64, StreamError> {
        let Some(backend) = self.backend.as_mut() else {
            return Err(StreamError::Closed);
        };
        match backend.seek(pos) {
            Ok(offset) => Ok(offset),
            Err(e) if e.kind() == io::ErrorKind::Unsupported => Err(StreamError::Unseekable),
            Err(e) => {
                self.flags.error = true;
                Err(StreamError::SeekFault(e))
            }
        }
    }

    /// Reposition the stream. Pending output is flushed, read-ahead and
    /// pushback are discarded, and the EOF indicator is cleared. A failed
    /// backend seek leaves read-ahead and pushback intact.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, StreamError> {
        if self.backend.is_none() {
            return Err(StreamError::Closed);
        }
        if self.dir == Direction::Writing {
            self.flush_pending()?;
        }
        let offset = self.backend_seek(pos)?;
        self.buffer.reset();
        self.pushback.clear();
        self.flags.eof = false;
        self.dir = Direction::Idle;
        Ok(offset)
    }

    /// Logical position: the backend offset corrected for bytes resident
    /// in the buffer and the pushback slot. Pushing back more bytes than
    /// were ever consumed puts the position before the start of the
    /// stream; it is clamped to zero.
    pub fn tell(&mut self) -> Result<u64, StreamError> {
        let raw = self.backend_seek(SeekFrom::Current(0))?;
        let logical = match self.dir {
            Direction::Reading => {
                raw.saturating_sub((self.buffer.occupied() + self.pushback.len()) as u64)
            }
            Direction::Writing => raw + self.buffer.occupied() as u64,
            Direction::Idle => raw,
        };
        Ok(logical)
    }

    /// Return to the start of the stream and clear both sticky indicators.
    pub fn rewind(&mut self) -> Result<(), StreamError> {
        self.seek(SeekFrom::Start(0))?;
        self.clear_status();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Close
    // -----------------------------------------------------------------------

    /// Flush pending output, release the backend exactly once, and drop
    /// the buffer region. A flush fault is reported but close still
    /// releases everything. Closing twice reports `Closed`.
    pub fn close(&mut self) -> Result<(), StreamError> {
        if self.backend.is_none() {
            return Err(StreamError::Closed);
        }
        let flush_result = if self.dir == Direction::Writing {
            self.flush_pending()
        } else {
            Ok(())
        };
        let close_result = match self.backend.take() {
            Some(mut backend) => backend.close().map_err(StreamError::CloseFault),
            None => Ok(()),
        };
        self.buffer.release();
        self.pushback.clear();
        self.dir = Direction::Idle;
        flush_result.and(close_result)
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        if self.backend.is_some() {
            let _ = self.close();
        }
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("closed", &self.backend.is_none())
            .field("mode", &self.buffer.mode())
            .field("capacity", &self.buffer.capacity())
            .field("pending", &self.buffer.occupied())
            .field("pushback", &self.pushback.len())
            .field("eof", &self.flags.eof)
            .field("error", &self.flags.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_memory_stream(capacity: usize) -> Stream {
        let mut stream = Stream::memory();
        stream.set_buffer(None, BufMode::Full, capacity).unwrap();
        stream
    }

    #[test]
    fn test_default_construction() {
        let stream = Stream::memory();
        assert_eq!(stream.buffer_mode(), BufMode::Full);
        assert_eq!(stream.buffer_capacity(), DEFAULT_BUF_SIZE);
        assert!(!stream.eof());
        assert!(!stream.has_error());
    }

    #[test]
    fn test_write_rewind_read_roundtrip() {
        let mut stream = small_memory_stream(8);
        assert_eq!(stream.write(b"hello buffered world"), 20);
        stream.rewind().unwrap();
        let mut out = vec![0u8; 32];
        assert_eq!(stream.read(&mut out), 20);
        assert_eq!(&out[..20], b"hello buffered world");
        assert!(stream.eof());
    }

    #[test]
    fn test_write_spanning_many_fills() {
        // Request larger than the region forces flushes mid-request; byte
        // accounting must stay exact.
        let mut stream = small_memory_stream(4);
        let payload: Vec<u8> = (0..=255u8).collect();
        assert_eq!(stream.write(&payload), 256);
        stream.rewind().unwrap();
        let mut out = vec![0u8; 256];
        assert_eq!(stream.read(&mut out), 256);
        assert_eq!(out, payload);
    }

    #[test]
    fn test_pushback_served_before_buffer() {
        let mut stream = Stream::memory_with_contents(b"rest".to_vec());
        stream.unget(b'1').unwrap();
        stream.unget(b'2').unwrap();
        let mut out = [0u8; 6];
        assert_eq!(stream.read(&mut out), 6);
        assert_eq!(&out, b"21rest");
    }

    #[test]
    fn test_pushback_overflow_rejected() {
        let mut stream = Stream::memory();
        for byte in 0..PUSHBACK_CAPACITY as u8 {
            stream.unget(byte).unwrap();
        }
        assert!(matches!(
            stream.unget(9),
            Err(StreamError::PushbackOverflow)
        ));
    }

    #[test]
    fn test_unget_clears_eof() {
        let mut stream = Stream::memory_with_contents(b"a".to_vec());
        let mut out = [0u8; 4];
        assert_eq!(stream.read(&mut out), 1);
        assert!(stream.eof());
        stream.unget(b'a').unwrap();
        assert!(!stream.eof());
        assert_eq!(stream.get(), Some(b'a'));
    }

    #[test]
    fn test_get_put_single_bytes() {
        let mut stream = Stream::memory();
        stream.put(b'x').unwrap();
        stream.put(b'y').unwrap();
        stream.rewind().unwrap();
        assert_eq!(stream.get(), Some(b'x'));
        assert_eq!(stream.get(), Some(b'y'));
        assert_eq!(stream.get(), None);
        assert!(stream.eof());
    }

    #[test]
    fn test_item_granularity() {
        let mut stream = Stream::memory_with_contents(b"abcdefg".to_vec());
        let mut out = [0u8; 8];
        // 7 bytes available: only two whole 3-byte items.
        assert_eq!(stream.read_items(&mut out, 3, 3), 2);
    }

    #[test]
    fn test_unbuffered_passthrough() {
        let mut stream = Stream::memory();
        stream.set_buffer(None, BufMode::None, 0).unwrap();
        assert_eq!(stream.buffer_capacity(), 0);
        assert_eq!(stream.write(b"direct"), 6);
        assert_eq!(stream.pending_bytes(), 0);
        stream.rewind().unwrap();
        let mut out = [0u8; 8];
        assert_eq!(stream.read(&mut out), 6);
        assert_eq!(&out[..6], b"direct");
    }

    #[test]
    fn test_line_buffering_rejected() {
        let mut stream = Stream::memory();
        assert!(matches!(
            stream.set_buffer(None, BufMode::Line, 0),
            Err(StreamError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_supplied_buffer_adopted() {
        let mut stream = Stream::memory();
        stream
            .set_buffer(Some(vec![0u8; 16]), BufMode::Full, 0)
            .unwrap();
        assert_eq!(stream.buffer_capacity(), 16);
    }

    #[test]
    fn test_tell_accounts_for_resident_bytes() {
        let mut stream = small_memory_stream(8);
        assert_eq!(stream.write(b"abc"), 3);
        // Nothing flushed yet; the logical position counts pending output.
        assert_eq!(stream.pending_bytes(), 3);
        assert_eq!(stream.tell().unwrap(), 3);
        stream.flush().unwrap();
        assert_eq!(stream.tell().unwrap(), 3);

        stream.rewind().unwrap();
        let mut out = [0u8; 1];
        assert_eq!(stream.read(&mut out), 1);
        // The fill pulled everything in; tell corrects for read-ahead.
        assert_eq!(stream.tell().unwrap(), 1);
        stream.unget(out[0]).unwrap();
        assert_eq!(stream.tell().unwrap(), 0);
    }

    #[test]
    fn test_tell_clamps_pushback_past_start() {
        // Pushing back onto a fresh stream puts the logical position
        // before byte zero; tell reports zero rather than wrapping.
        let mut stream = Stream::memory_with_contents(b"abc".to_vec());
        stream.unget(b'z').unwrap();
        assert_eq!(stream.tell().unwrap(), 0);
        assert_eq!(stream.get(), Some(b'z'));
        assert_eq!(stream.get(), Some(b'a'));
    }

    #[test]
    fn test_seek_discards_readahead() {
        let mut stream = Stream::memory_with_contents(b"abcdef".to_vec());
        assert_eq!(stream.get(), Some(b'a'));
        stream.seek(SeekFrom::Start(4)).unwrap();
        assert_eq!(stream.get(), Some(b'e'));
    }

    #[test]
    fn test_close_is_not_repeatable() {
        let mut stream = Stream::memory();
        assert_eq!(stream.write(b"tail"), 4);
        stream.close().unwrap();
        assert!(stream.is_closed());
        assert_eq!(stream.buffer_capacity(), 0);
        assert!(matches!(stream.close(), Err(StreamError::Closed)));
    }

    #[test]
    fn test_write_on_closed_stream() {
        let mut stream = Stream::memory();
        stream.close().unwrap();
        assert_eq!(stream.write(b"x"), 0);
        assert!(matches!(stream.put(b'x'), Err(StreamError::Closed)));
    }
}
