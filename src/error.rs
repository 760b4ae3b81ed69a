//! Error types for the bsdiff/bspatch delta engine.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when building or applying a patch, along with a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. The
//! numeric [`Error::code`] matches the return codes used at the reference
//! implementation's public boundary, which is useful when embedding this
//! crate behind a C-style API or mapping to process exit codes.
//!
//! ```rust,no_run
//! use bsdelta::{Error, Result};
//!
//! fn handle(err: &Error) {
//!     match err {
//!         Error::CorruptPatch(reason) => eprintln!("bad patch: {reason}"),
//!         Error::Io(e) => eprintln!("I/O error: {e}"),
//!         _ => eprintln!("error: {err}"),
//!     }
//! }
//! ```

use std::io;

/// The main error type for delta engine operations.
///
/// Each variant corresponds to one of the numeric return codes from the
/// reference implementation's public boundary (see [`Error::code`]).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A generic failure that does not fit another category.
    #[error("{0}")]
    Generic(String),

    /// An I/O error occurred during a stream operation.
    ///
    /// This wraps [`std::io::Error`] and is returned when the underlying
    /// reader, writer, or file fails.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An argument was invalid for the operation being performed: a stream
    /// was driven in the wrong mode, a seek landed outside its legal range,
    /// or a packer method was called out of order.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Allocating a buffer (old file, new file, suffix array, or patch
    /// accumulator) failed.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// A short read occurred somewhere other than the true end of a stream,
    /// or a write did not accept all requested bytes.
    #[error("file error: {0}")]
    FileError(String),

    /// A read reached the true end of its stream.
    ///
    /// This is a control-flow signal as much as an error: callers that
    /// expect to exhaust a stream (e.g. a decompressor at a sub-stream
    /// boundary) treat it as success.
    #[error("end of file")]
    EndOfFile,

    /// The patch container is malformed: bad magic, a negative header
    /// field, a truncated compressed section, or a per-entry byte count
    /// that underflows.
    #[error("corrupt patch: {0}")]
    CorruptPatch(String),

    /// An input exceeds what can be addressed on this platform (its length,
    /// or the suffix array it would require, does not fit in `usize`/`isize`).
    #[error("size too large: {0}")]
    SizeTooLarge(String),
}

/// A specialized [`Result`] type for delta engine operations.
///
/// [`Result`]: std::result::Result
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the numeric return code for this error, matching the
    /// reference implementation's `BSDIFF_*` constants.
    ///
    /// | Code | Meaning |
    /// |---|---|
    /// | 1 | generic error |
    /// | 2 | invalid argument |
    /// | 3 | out of memory |
    /// | 4 | file error |
    /// | 5 | end of file |
    /// | 6 | corrupt patch |
    /// | 7 | size too large |
    pub fn code(&self) -> i32 {
        match self {
            Error::Generic(_) => 1,
            Error::Io(_) => 4,
            Error::InvalidArg(_) => 2,
            Error::OutOfMemory(_) => 3,
            Error::FileError(_) => 4,
            Error::EndOfFile => 5,
            Error::CorruptPatch(_) => 6,
            Error::SizeTooLarge(_) => 7,
        }
    }
}

/// Success return code, exposed for callers that want to mirror the full
/// `BSDIFF_*` constant table rather than relying on [`Error::code`].
pub const SUCCESS: i32 = 0;
