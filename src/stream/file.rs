//! [`Stream`] backed by an OS file.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use super::{Mode, SeekOrigin, Stream};
use crate::error::{Error, Result};

/// A [`Stream`] over a file opened in exactly one direction.
///
/// Mirrors the reference implementation's `bsdiff_open_file_stream`: a
/// read-mode handle only ever reads, a write-mode handle only ever writes.
pub struct FileStream {
    mode: Mode,
    file: File,
}

impl FileStream {
    /// Opens `path` for reading.
    pub fn open_read(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(FileStream {
            mode: Mode::Read,
            file,
        })
    }

    /// Creates (truncating) `path` for writing.
    pub fn open_write(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(FileStream {
            mode: Mode::Write,
            file,
        })
    }
}

impl Stream for FileStream {
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<i64> {
        let from = match origin {
            SeekOrigin::Set => std::io::SeekFrom::Start(offset.max(0) as u64),
            SeekOrigin::Cur => std::io::SeekFrom::Current(offset),
            SeekOrigin::End => std::io::SeekFrom::End(offset),
        };
        if origin == SeekOrigin::Set && offset < 0 {
            return Err(Error::InvalidArg(format!("negative seek offset {offset}")));
        }
        let pos = self.file.seek(from)?;
        Ok(pos as i64)
    }

    fn tell(&mut self) -> Result<i64> {
        let pos = self.file.stream_position()?;
        Ok(pos as i64)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.mode != Mode::Read {
            return Err(Error::InvalidArg("read on a write-mode stream".into()));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        Ok(self.file.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.mode != Mode::Write {
            return Err(Error::InvalidArg("write on a read-mode stream".into()));
        }
        self.file.write_all(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.mode != Mode::Write {
            return Err(Error::InvalidArg("flush on a read-mode stream".into()));
        }
        Ok(self.file.flush()?)
    }

    fn mode(&self) -> Mode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn write_then_reopen_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.bin");

        let mut w = FileStream::open_write(&path).unwrap();
        w.write(b"hello").unwrap();
        w.flush().unwrap();

        let mut contents = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"hello");

        let mut r = FileStream::open_read(&path).unwrap();
        let mut buf = [0u8; 5];
        assert_eq!(r.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn seek_end_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.bin");
        let mut w = FileStream::open_write(&path).unwrap();
        w.write(b"0123456789").unwrap();
        drop(w);

        let mut r = FileStream::open_read(&path).unwrap();
        let size = r.seek(0, SeekOrigin::End).unwrap();
        assert_eq!(size, 10);
        r.seek(0, SeekOrigin::Set).unwrap();
        assert_eq!(r.tell().unwrap(), 0);
    }
}
