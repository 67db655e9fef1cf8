//! Standard-stream backends.
//!
//! Fresh handles over the process standard streams, not singletons; the
//! caller decides how many stream wrappers exist. Standard streams are not
//! seekable, which the contract reports as `ErrorKind::Unsupported`.

use std::io::{self, Read, SeekFrom, Write};

use super::StreamBackend;

/// One of the three process standard streams.
pub enum StandardBackend {
    In(io::Stdin),
    Out(io::Stdout),
    Err(io::Stderr),
}

impl StandardBackend {
    pub fn stdin() -> Self {
        StandardBackend::In(io::stdin())
    }

    pub fn stdout() -> Self {
        StandardBackend::Out(io::stdout())
    }

    pub fn stderr() -> Self {
        StandardBackend::Err(io::stderr())
    }
}

fn unsupported(what: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, what)
}

impl StreamBackend for StandardBackend {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        match self {
            StandardBackend::In(handle) => handle.read(dst),
            _ => Err(unsupported("standard output streams are write-only")),
        }
    }

    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        match self {
            StandardBackend::In(_) => Err(unsupported("standard input is read-only")),
            StandardBackend::Out(handle) => handle.write(src),
            StandardBackend::Err(handle) => handle.write(src),
        }
    }

    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(unsupported("standard streams are not seekable"))
    }

    fn close(&mut self) -> io::Result<()> {
        match self {
            StandardBackend::In(_) => Ok(()),
            StandardBackend::Out(handle) => handle.flush(),
            StandardBackend::Err(handle) => handle.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdin_rejects_write() {
        let mut backend = StandardBackend::stdin();
        assert_eq!(
            backend.write(b"x").unwrap_err().kind(),
            io::ErrorKind::Unsupported
        );
    }

    #[test]
    fn test_stdout_rejects_read() {
        let mut backend = StandardBackend::stdout();
        let mut out = [0u8; 1];
        assert_eq!(
            backend.read(&mut out).unwrap_err().kind(),
            io::ErrorKind::Unsupported
        );
    }

    #[test]
    fn test_standard_streams_not_seekable() {
        let mut backend = StandardBackend::stderr();
        assert_eq!(
            backend.seek(SeekFrom::Start(0)).unwrap_err().kind(),
            io::ErrorKind::Unsupported
        );
    }
}
