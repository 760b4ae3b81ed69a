//! BZip2-backed [`Compressor`]/[`Decompressor`].
//!
//! Grounded on `examples/original_source/source/compressor_bz2.c` and
//! `decompressor_bz2.c`: level 9, default 30-byte work factor, one frame
//! per section of the container.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use bzip2::Compression;
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;

use super::{Compressor, Decompressor};
use crate::error::{Error, Result};
use crate::stream::Stream;

/// Adapts a shared [`Stream`] to [`std::io::Write`] so bzip2's encoder can
/// sit on top of it.
struct StreamWriter(Rc<RefCell<dyn Stream>>);

impl io::Write for StreamWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .borrow_mut()
            .write(buf)
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .borrow_mut()
            .flush()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

/// Adapts a shared [`Stream`] to [`std::io::Read`] so bzip2's decoder can
/// sit on top of it.
struct StreamReader(Rc<RefCell<dyn Stream>>);

impl io::Read for StreamReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.borrow_mut().read(buf) {
            Ok(n) => Ok(n),
            Err(Error::EndOfFile) => Ok(0),
            Err(e) => Err(io::Error::other(e.to_string())),
        }
    }
}

/// BZip2 [`Compressor`], level 9.
pub struct Bzip2Compressor {
    encoder: Option<BzEncoder<StreamWriter>>,
}

impl Bzip2Compressor {
    /// Opens a compressor whose compressed frame is written to `output`.
    pub fn new(output: Rc<RefCell<dyn Stream>>) -> Self {
        Bzip2Compressor {
            encoder: Some(BzEncoder::new(StreamWriter(output), Compression::best())),
        }
    }
}

impl Compressor for Bzip2Compressor {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| Error::InvalidArg("write after flush on a compressor".into()))?;
        io::Write::write_all(encoder, data).map_err(|e| Error::FileError(e.to_string()))
    }

    fn flush(&mut self) -> Result<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| Error::InvalidArg("double flush on a compressor".into()))?;
        let mut writer = encoder
            .finish()
            .map_err(|e| Error::FileError(e.to_string()))?;
        io::Write::flush(&mut writer).map_err(|e| Error::FileError(e.to_string()))
    }
}

/// BZip2 [`Decompressor`].
pub struct Bzip2Decompressor {
    decoder: BzDecoder<StreamReader>,
}

impl Bzip2Decompressor {
    /// Opens a decompressor reading its compressed frame from `input`.
    pub fn new(input: Rc<RefCell<dyn Stream>>) -> Self {
        Bzip2Decompressor {
            decoder: BzDecoder::new(StreamReader(input)),
        }
    }
}

impl Decompressor for Bzip2Decompressor {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        io::Read::read(&mut self.decoder, buf).map_err(|e| Error::FileError(e.to_string()))
    }
}
