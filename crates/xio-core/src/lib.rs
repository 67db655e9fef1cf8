//! # xio-core
//!
//! A portable buffered stream abstraction. One uniform [`Stream`] handle
//! over any byte sink/source — a native file, an in-process growable
//! region, an adopted handle, the standard streams — with stdio-style
//! buffering, pushback, and formatted output layered transparently on top.
//!
//! Byte transport is pluggable through the [`StreamBackend`] dispatch
//! contract; the stream core is backend-agnostic and single-threaded by
//! design (one logical owner per stream, no internal locking).

#![deny(unsafe_code)]

pub mod backend;
pub mod error;
pub mod registry;
pub mod stream;

pub use backend::{FileBackend, HandleBackend, MemoryBackend, StandardBackend, StreamBackend};
pub use error::{Result, StreamError};
pub use registry::{StreamId, StreamRegistry};
pub use stream::{BufMode, DEFAULT_BUF_SIZE, FormatArg, PUSHBACK_CAPACITY, Stream};
