//! Read-only windowed view over a parent [`Stream`].

use std::cell::RefCell;
use std::rc::Rc;

use super::{Mode, SeekOrigin, Stream};
use crate::error::{Error, Result};

/// A read-only window `[start, end)` over a parent read stream.
///
/// Every read reseeks the parent to the sub-stream's own cursor first, so
/// several sub-streams sharing one parent can interleave reads without
/// corrupting each other's position — at the cost of that extra seek on
/// every call. The parent is reference-counted rather than owned: the
/// [`PatchPacker`](crate::packer::PatchPacker) opens three of these over a
/// single patch stream and drives all three decompressors in lockstep.
pub struct SubStream {
    parent: Rc<RefCell<dyn Stream>>,
    start: i64,
    end: i64,
    current: i64,
}

impl SubStream {
    /// Opens a window `[start, end)` over `parent`, which must itself be a
    /// read-mode stream at least `end` bytes long.
    pub fn new(parent: Rc<RefCell<dyn Stream>>, start: i64, end: i64) -> Result<Self> {
        {
            let mut p = parent.borrow_mut();
            if p.mode() != Mode::Read {
                return Err(Error::InvalidArg("sub-stream parent must be read-mode".into()));
            }
            if start < 0 || end <= start {
                return Err(Error::InvalidArg(format!(
                    "invalid sub-stream range [{start}, {end})"
                )));
            }
            let saved = p.tell()?;
            let base_size = p.seek(0, SeekOrigin::End)?;
            p.seek(saved, SeekOrigin::Set)?;
            if end > base_size {
                return Err(Error::InvalidArg(format!(
                    "sub-stream end {end} exceeds parent size {base_size}"
                )));
            }
        }
        Ok(SubStream {
            parent,
            start,
            end,
            current: start,
        })
    }

    /// The length of this window, in bytes.
    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    /// Whether this window is empty. Never true: `new` rejects `end <= start`.
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl Stream for SubStream {
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<i64> {
        // Only SET is meaningful for a fixed window; CUR/END would require
        // tracking size independently, which the window already encodes.
        if origin != SeekOrigin::Set {
            return Err(Error::InvalidArg("sub-stream only supports SeekOrigin::Set".into()));
        }
        if offset < self.start || offset > self.end {
            return Err(Error::InvalidArg(format!(
                "seek to {offset} outside window [{}, {}]",
                self.start, self.end
            )));
        }
        self.current = offset;
        Ok(self.current)
    }

    fn tell(&mut self) -> Result<i64> {
        Ok(self.current)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.current == self.end {
            return Ok(0);
        }
        let remaining = (self.end - self.current) as usize;
        let want = buf.len().min(remaining);
        let mut parent = self.parent.borrow_mut();
        parent.seek(self.current, SeekOrigin::Set)?;
        let n = parent.read(&mut buf[..want])?;
        drop(parent);
        self.current += n as i64;
        Ok(n)
    }

    fn write(&mut self, _buf: &[u8]) -> Result<()> {
        Err(Error::InvalidArg("sub-stream is read-only".into()))
    }

    fn flush(&mut self) -> Result<()> {
        Err(Error::InvalidArg("sub-stream is read-only".into()))
    }

    fn mode(&self) -> Mode {
        Mode::Read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    fn shared(bytes: &[u8]) -> Rc<RefCell<dyn Stream>> {
        Rc::new(RefCell::new(MemoryStream::from_bytes(bytes.to_vec())))
    }

    #[test]
    fn windowed_read_is_clamped() {
        let parent = shared(b"0123456789");
        let mut sub = SubStream::new(parent, 2, 5).unwrap();
        let mut buf = [0u8; 10];
        let n = sub.read(&mut buf).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&buf[..3], b"234");
        assert_eq!(sub.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn three_substreams_interleave_without_corruption() {
        let parent = shared(b"abcdefghij");
        let mut a = SubStream::new(parent.clone(), 0, 4).unwrap(); // abcd
        let mut b = SubStream::new(parent.clone(), 4, 7).unwrap(); // efg
        let mut c = SubStream::new(parent, 7, 10).unwrap(); // hij

        let mut buf = [0u8; 1];
        let mut a_out = Vec::new();
        let mut b_out = Vec::new();
        let mut c_out = Vec::new();

        // Interleave one byte at a time across all three windows.
        loop {
            let mut any = false;
            if a.read(&mut buf).unwrap() == 1 {
                a_out.push(buf[0]);
                any = true;
            }
            if b.read(&mut buf).unwrap() == 1 {
                b_out.push(buf[0]);
                any = true;
            }
            if c.read(&mut buf).unwrap() == 1 {
                c_out.push(buf[0]);
                any = true;
            }
            if !any {
                break;
            }
        }

        assert_eq!(a_out, b"abcd");
        assert_eq!(b_out, b"efg");
        assert_eq!(c_out, b"hij");
    }

    #[test]
    fn seek_rejects_out_of_window() {
        let parent = shared(b"0123456789");
        let mut sub = SubStream::new(parent, 2, 5).unwrap();
        assert!(sub.seek(1, SeekOrigin::Set).is_err());
        assert!(sub.seek(6, SeekOrigin::Set).is_err());
        assert!(sub.seek(5, SeekOrigin::Set).is_ok());
    }
}
