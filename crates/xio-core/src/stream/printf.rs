//! Formatted writer: a thin consumer of the buffered write path.
//!
//! Arguments are a typed list rather than varargs, so conversion/argument
//! mismatches are rejected instead of reading garbage. Supported
//! conversions: `%d %u %f %c %s %p %%`. Unknown conversions pass through
//! verbatim (the `%` and the following byte are emitted unchanged).

use std::fmt::Write as _;

use super::Stream;
use crate::error::StreamError;

/// Rendered conversions are pushed through the write path in chunks of at
/// most this many bytes.
const CONVERSION_BUF_SIZE: usize = 1024;

/// A typed argument for one format conversion.
#[derive(Debug, Clone, Copy)]
pub enum FormatArg<'a> {
    /// `%d`
    Int(i64),
    /// `%u`
    Uint(u64),
    /// `%f` — rendered with six fractional digits.
    Float(f64),
    /// `%c`
    Char(u8),
    /// `%s`
    Str(&'a str),
    /// `%p` — an opaque id rendered as lowercase hex with a `0x` prefix.
    Ptr(usize),
}

impl Stream {
    /// Walk `fmt`, passing literal bytes through unchanged and rendering
    /// one argument per conversion. Returns the total byte count written.
    ///
    /// Too few arguments, leftover arguments, and a type that does not
    /// match its conversion are all `InvalidFormat` errors.
    pub fn write_formatted(
        &mut self,
        fmt: &str,
        args: &[FormatArg<'_>],
    ) -> Result<usize, StreamError> {
        let bytes = fmt.as_bytes();
        let mut next_arg = 0;
        let mut written = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] != b'%' {
                let run_start = i;
                while i < bytes.len() && bytes[i] != b'%' {
                    i += 1;
                }
                self.write_all(&bytes[run_start..i])?;
                written += i - run_start;
                continue;
            }

            i += 1;
            if i == bytes.len() {
                // Trailing lone '%': emitted as-is.
                self.write_all(b"%")?;
                written += 1;
                break;
            }
            let conversion = bytes[i];
            i += 1;

            match conversion {
                b'%' => {
                    self.write_all(b"%")?;
                    written += 1;
                }
                b'd' | b'u' | b'f' | b'c' | b's' | b'p' => {
                    let arg = args
                        .get(next_arg)
                        .ok_or(StreamError::InvalidFormat(
                            "too few arguments for format string",
                        ))?;
                    next_arg += 1;
                    written += self.render_conversion(conversion, arg)?;
                }
                other => {
                    self.write_all(&[b'%', other])?;
                    written += 2;
                }
            }
        }

        if next_arg != args.len() {
            return Err(StreamError::InvalidFormat(
                "arguments left over after format string",
            ));
        }
        Ok(written)
    }

    fn render_conversion(
        &mut self,
        conversion: u8,
        arg: &FormatArg<'_>,
    ) -> Result<usize, StreamError> {
        let mut scratch = String::new();
        match (conversion, arg) {
            (b'd', FormatArg::Int(v)) => {
                let _ = write!(scratch, "{v}");
            }
            (b'u', FormatArg::Uint(v)) => {
                let _ = write!(scratch, "{v}");
            }
            (b'f', FormatArg::Float(v)) => {
                let _ = write!(scratch, "{v:.6}");
            }
            (b'p', FormatArg::Ptr(v)) => {
                let _ = write!(scratch, "{v:#x}");
            }
            (b'c', FormatArg::Char(byte)) => {
                self.put(*byte)?;
                return Ok(1);
            }
            (b's', FormatArg::Str(s)) => {
                for chunk in s.as_bytes().chunks(CONVERSION_BUF_SIZE) {
                    self.write_all(chunk)?;
                }
                return Ok(s.len());
            }
            _ => {
                return Err(StreamError::InvalidFormat(
                    "argument type does not match conversion",
                ));
            }
        }
        self.write_all(scratch.as_bytes())?;
        Ok(scratch.len())
    }
}
