//! Streaming entropy coder abstraction.
//!
//! The delta engine never depends on a concrete compression format; it
//! depends only on the [`Compressor`]/[`Decompressor`] contract. The
//! container format (`BSDIFF40`) uses bzip2 for all three of its sections,
//! wired up behind the `bzip2` Cargo feature by the [`bzip2`] submodule.

#[cfg(feature = "bzip2")]
pub mod bzip2;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::stream::Stream;

/// A streaming compression sink.
///
/// Implementations wrap a [`Stream`] opened in write mode. After
/// [`Compressor::flush`], the wrapped stream holds a complete,
/// self-delimited compressed frame; nothing more may be written to the
/// same frame afterward.
pub trait Compressor {
    /// Compresses and buffers `data`; may be called any number of times
    /// before [`Compressor::flush`].
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Finalizes the compressed frame and writes any remaining buffered
    /// output to the underlying stream.
    fn flush(&mut self) -> Result<()>;
}

/// A streaming decompression source.
///
/// Implementations wrap a [`Stream`] opened in read mode — typically a
/// [`SubStream`](crate::stream::SubStream) bounding exactly one compressed
/// frame within a larger container.
pub trait Decompressor {
    /// Decompresses up to `buf.len()` bytes. Returns `0` exactly when the
    /// compressed frame (not necessarily the underlying stream) is
    /// exhausted.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Constructs the default [`Compressor`], writing its frame to `output`.
#[cfg(feature = "bzip2")]
pub fn new_compressor(output: Rc<RefCell<dyn Stream>>) -> Box<dyn Compressor> {
    Box::new(self::bzip2::Bzip2Compressor::new(output))
}

/// Constructs the default [`Decompressor`], reading its frame from `input`.
#[cfg(feature = "bzip2")]
pub fn new_decompressor(input: Rc<RefCell<dyn Stream>>) -> Box<dyn Decompressor> {
    Box::new(self::bzip2::Bzip2Decompressor::new(input))
}
