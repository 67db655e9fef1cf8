//! Native file backend and fopen-style mode strings.
//!
//! Mode strings follow the stdio convention: a base of `r`, `w`, or `a`,
//! optionally followed by `+`, `b`, and `x` modifiers in any order.
//! Translation to OS open flags happens here, not in the stream core.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use super::StreamBackend;

/// Parsed open-mode flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFlags {
    pub readable: bool,
    pub writable: bool,
    pub append: bool,
    pub truncate: bool,
    pub create: bool,
    pub binary: bool,
    pub exclusive: bool,
}

/// Parse a stdio mode string (e.g. `"r"`, `"w+"`, `"rb"`, `"a+x"`).
///
/// Returns `None` if the string is empty or contains an unknown character.
pub fn parse_mode(mode: &str) -> Option<OpenFlags> {
    let mut bytes = mode.bytes();
    let mut flags = OpenFlags::default();

    match bytes.next()? {
        b'r' => {
            flags.readable = true;
        }
        b'w' => {
            flags.writable = true;
            flags.create = true;
            flags.truncate = true;
        }
        b'a' => {
            flags.writable = true;
            flags.create = true;
            flags.append = true;
        }
        _ => return None,
    }

    for modifier in bytes {
        match modifier {
            b'+' => {
                flags.readable = true;
                flags.writable = true;
            }
            b'b' => flags.binary = true,
            b'x' => flags.exclusive = true,
            _ => return None,
        }
    }

    Some(flags)
}

fn open_options(flags: &OpenFlags) -> OpenOptions {
    let mut options = OpenOptions::new();
    options
        .read(flags.readable)
        .write(flags.writable && !flags.append)
        .append(flags.append)
        .truncate(flags.truncate)
        .create(flags.create && !flags.exclusive)
        .create_new(flags.exclusive);
    options
}

/// A native file satisfying the dispatch contract.
#[derive(Debug)]
pub struct FileBackend {
    file: File,
}

impl FileBackend {
    /// Open `path` with the given parsed flags.
    pub fn open(path: &Path, flags: &OpenFlags) -> io::Result<Self> {
        let file = open_options(flags).open(path)?;
        Ok(Self { file })
    }

    /// Adopt an already-open native handle.
    pub fn from_file(file: File) -> Self {
        Self { file }
    }
}

impl StreamBackend for FileBackend {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        self.file.read(dst)
    }

    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        self.file.write(src)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn close(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_read() {
        let f = parse_mode("r").unwrap();
        assert!(f.readable);
        assert!(!f.writable);
        assert!(!f.append);
    }

    #[test]
    fn test_parse_mode_write() {
        let f = parse_mode("w").unwrap();
        assert!(!f.readable);
        assert!(f.writable);
        assert!(f.create);
        assert!(f.truncate);
    }

    #[test]
    fn test_parse_mode_append_plus() {
        let f = parse_mode("a+").unwrap();
        assert!(f.readable);
        assert!(f.writable);
        assert!(f.append);
        assert!(!f.truncate);
    }

    #[test]
    fn test_parse_mode_binary_exclusive() {
        let f = parse_mode("wbx").unwrap();
        assert!(f.binary);
        assert!(f.exclusive);
    }

    #[test]
    fn test_parse_mode_invalid() {
        assert!(parse_mode("").is_none());
        assert!(parse_mode("z").is_none());
        assert!(parse_mode("rw").is_none());
    }

    #[test]
    fn test_file_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.bin");

        let flags = parse_mode("w").unwrap();
        let mut backend = FileBackend::open(&path, &flags).unwrap();
        assert_eq!(backend.write(b"payload").unwrap(), 7);
        backend.close().unwrap();
        drop(backend);

        let flags = parse_mode("r").unwrap();
        let mut backend = FileBackend::open(&path, &flags).unwrap();
        let mut out = [0u8; 16];
        assert_eq!(backend.read(&mut out).unwrap(), 7);
        assert_eq!(&out[..7], b"payload");
        assert_eq!(backend.read(&mut out).unwrap(), 0);
    }
}
