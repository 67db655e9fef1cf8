//! Error taxonomy for stream operations.
//!
//! Backend faults carry the underlying `std::io::Error`. End-of-stream is
//! not an error: reads report it through a short count plus the sticky EOF
//! flag on the stream.

use std::io;
use thiserror::Error;

/// Errors surfaced by [`Stream`](crate::stream::Stream) operations.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The backend reported a fault while filling the read buffer.
    #[error("backend read fault: {0}")]
    ReadFault(#[source] io::Error),

    /// The backend reported a fault or accepted zero bytes during a flush.
    #[error("backend write fault: {0}")]
    WriteFault(#[source] io::Error),

    /// The backend reported a fault while repositioning.
    #[error("backend seek fault: {0}")]
    SeekFault(#[source] io::Error),

    /// The backend reported a fault while releasing its resources.
    #[error("backend close fault: {0}")]
    CloseFault(#[source] io::Error),

    /// Opening the underlying resource failed before a stream existed.
    #[error("open failed: {0}")]
    Open(#[source] io::Error),

    /// The backend does not support repositioning (standard streams).
    #[error("stream is not seekable")]
    Unseekable,

    /// The pushback slot is full; the byte was rejected, no state changed.
    #[error("pushback capacity exhausted")]
    PushbackOverflow,

    /// Unsupported buffering mode or inconsistent buffer/size combination.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Format string and argument list disagree.
    #[error("invalid format: {0}")]
    InvalidFormat(&'static str),

    /// The stream was opened read-only.
    #[error("stream is not open for writing")]
    NotWritable,

    /// The stream was opened write-only.
    #[error("stream is not open for reading")]
    NotReadable,

    /// The stream was already closed; its backend and buffer are gone.
    #[error("stream already closed")]
    Closed,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StreamError>;
