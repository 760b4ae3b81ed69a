//! In-memory [`Stream`] backed by a growable buffer.

use super::{Mode, SeekOrigin, Stream};
use crate::error::{Error, Result};

/// Starting capacity for a freshly created write-mode [`MemoryStream`].
const INITIAL_CAPACITY: usize = 64;

fn grow_capacity(current: usize, required: usize) -> usize {
    let mut cap = current;
    while cap < required {
        cap = if cap == 0 {
            INITIAL_CAPACITY
        } else {
            // empty() ? 64 : capacity() * 1.5, integer division rounded up.
            (cap * 3 + 1) / 2
        };
    }
    cap
}

/// A [`Stream`] over an in-memory byte buffer.
///
/// Read-mode instances wrap an existing buffer (the old file, or a patch
/// already assembled in memory). Write-mode instances start empty and grow
/// geometrically as bytes are written, so that building up a patch or a
/// reconstructed new file in memory doesn't reallocate on every write.
pub struct MemoryStream {
    mode: Mode,
    buffer: Vec<u8>,
    /// Logical size; for write mode this is the high-water mark of `pos`,
    /// which may be less than `buffer.capacity()`.
    size: usize,
    pos: usize,
}

impl MemoryStream {
    /// Opens a read-mode stream over an existing buffer.
    pub fn from_bytes(buffer: Vec<u8>) -> Self {
        let size = buffer.len();
        MemoryStream {
            mode: Mode::Read,
            buffer,
            size,
            pos: 0,
        }
    }

    /// Opens an empty read-mode stream (every read immediately hits EOF).
    pub fn new_empty_read() -> Self {
        MemoryStream::from_bytes(Vec::new())
    }

    /// Opens an empty write-mode stream.
    pub fn new_write() -> Self {
        MemoryStream {
            mode: Mode::Write,
            buffer: Vec::new(),
            size: 0,
            pos: 0,
        }
    }

    /// Consumes the stream, returning the bytes written (or the original
    /// buffer, for a read-mode stream).
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buffer.truncate(self.size);
        self.buffer
    }
}

impl Stream for MemoryStream {
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<i64> {
        let base = match origin {
            SeekOrigin::Set => 0i64,
            SeekOrigin::Cur => self.pos as i64,
            SeekOrigin::End => self.size as i64,
        };
        let newpos = base
            .checked_add(offset)
            .ok_or_else(|| Error::InvalidArg("seek overflow".into()))?;
        if newpos < 0 || newpos > self.size as i64 {
            return Err(Error::InvalidArg(format!(
                "seek to {newpos} out of range [0, {}]",
                self.size
            )));
        }
        self.pos = newpos as usize;
        Ok(newpos)
    }

    fn tell(&mut self) -> Result<i64> {
        Ok(self.pos as i64)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.mode != Mode::Read {
            return Err(Error::InvalidArg("read on a write-mode stream".into()));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        let available = self.size - self.pos;
        let n = buf.len().min(available);
        buf[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.mode != Mode::Write {
            return Err(Error::InvalidArg("write on a read-mode stream".into()));
        }
        if buf.is_empty() {
            return Ok(());
        }
        let required = self
            .pos
            .checked_add(buf.len())
            .ok_or_else(|| Error::InvalidArg("write overflow".into()))?;
        if required > self.buffer.len() {
            let newcap = grow_capacity(self.buffer.len(), required);
            self.buffer.resize(newcap, 0);
        }
        self.buffer[self.pos..required].copy_from_slice(buf);
        self.pos = required;
        if self.pos > self.size {
            self.size = self.pos;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.mode != Mode::Write {
            return Err(Error::InvalidArg("flush on a read-mode stream".into()));
        }
        Ok(())
    }

    fn get_buffer(&self) -> Option<&[u8]> {
        Some(&self.buffer[..self.size])
    }

    fn mode(&self) -> Mode {
        self.mode
    }
}
