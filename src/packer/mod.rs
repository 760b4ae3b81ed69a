//! Logical reader/writer of the `BSDIFF40` container over three
//! independently compressed sub-streams.
//!
//! Grounded on `examples/original_source/source/patch_packer_bz2.c`. The
//! reference hardcodes bzip2; this keeps the same shape but goes through
//! the [`Compressor`]/[`Decompressor`] trait objects from [`crate::codec`]
//! so a future entropy coder only has to implement that pair.

use std::cell::RefCell;
use std::rc::Rc;

use crate::codec::{Compressor, Decompressor};
use crate::error::{Error, Result};
use crate::offset;
use crate::stream::{Mode, SeekOrigin, Stream, SubStream, read_exact};

const MAGIC: &[u8; 8] = b"BSDIFF40";
const HEADER_LEN: i64 = 32;

/// One decoded control triple: diff length, extra length, old-side seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEntry {
    /// Number of bytes to add onto the old file, byte-for-byte, at the
    /// current position.
    pub diff: i64,
    /// Number of bytes to copy verbatim from the EXTRA section afterward.
    pub extra: i64,
    /// Signed seek applied to the old-file cursor once this entry is done.
    pub seek: i64,
}

struct WriteState {
    new_size: i64,
    control_enc: Box<dyn Compressor>,
    diff_buf: Vec<u8>,
    extra_buf: Vec<u8>,
    pending_diff: i64,
    pending_extra: i64,
}

struct ReadState {
    new_size: i64,
    control_dec: Box<dyn Decompressor>,
    diff_dec: Box<dyn Decompressor>,
    extra_dec: Box<dyn Decompressor>,
    remaining_diff: i64,
    remaining_extra: i64,
}

enum State {
    Write(WriteState),
    Read(ReadState),
}

/// A [`PatchPacker`] bound to a single patch [`Stream`], in either read or
/// write mode.
pub struct PatchPacker {
    stream: Rc<RefCell<dyn Stream>>,
    state: State,
}

impl PatchPacker {
    /// Opens a packer over `stream` in write mode. `stream` must itself be
    /// a write-mode stream, seekable back to offset 0 at [`flush`](Self::flush) time.
    pub fn create(stream: Rc<RefCell<dyn Stream>>) -> Result<Self> {
        if stream.borrow().mode() != Mode::Write {
            return Err(Error::InvalidArg("patch packer requires a write-mode stream".into()));
        }
        stream.borrow_mut().write(&[0u8; HEADER_LEN as usize])?;
        let control_enc = crate::codec::new_compressor(stream.clone());
        Ok(PatchPacker {
            stream,
            state: State::Write(WriteState {
                new_size: -1,
                control_enc,
                diff_buf: Vec::new(),
                extra_buf: Vec::new(),
                pending_diff: 0,
                pending_extra: 0,
            }),
        })
    }

    /// Opens a packer over `stream` in read mode, immediately parsing the
    /// header and wiring up the three section decompressors.
    pub fn open(stream: Rc<RefCell<dyn Stream>>) -> Result<Self> {
        if stream.borrow().mode() != Mode::Read {
            return Err(Error::InvalidArg("patch packer requires a read-mode stream".into()));
        }
        let mut header = [0u8; HEADER_LEN as usize];
        {
            let mut s = stream.borrow_mut();
            s.seek(0, SeekOrigin::Set)?;
            read_exact(&mut *s, &mut header).map_err(|e| match e {
                Error::EndOfFile => Error::CorruptPatch("patch shorter than the 32-byte header".into()),
                other => other,
            })?;
        }
        if &header[0..8] != MAGIC {
            log::warn!("patch header has bad magic {:?}", &header[0..8]);
            return Err(Error::CorruptPatch(format!(
                "bad magic {:?}, expected {:?}",
                &header[0..8],
                MAGIC
            )));
        }
        let control_len = offset::decode(header[8..16].try_into().unwrap());
        let diff_len = offset::decode(header[16..24].try_into().unwrap());
        let new_size = offset::decode(header[24..32].try_into().unwrap());
        if control_len < 0 || diff_len < 0 || new_size < 0 {
            log::warn!(
                "patch header has a negative length field: control={control_len} diff={diff_len} new_size={new_size}"
            );
            return Err(Error::CorruptPatch("negative header field".into()));
        }

        let control_start = HEADER_LEN;
        let control_end = control_start + control_len;
        let diff_end = control_end + diff_len;
        let total_len = {
            let mut s = stream.borrow_mut();
            let saved = s.tell()?;
            let end = s.seek(0, SeekOrigin::End)?;
            s.seek(saved, SeekOrigin::Set)?;
            end
        };
        if diff_end > total_len {
            log::warn!(
                "patch header claims control+diff end at {diff_end}, but the patch is only {total_len} bytes"
            );
            return Err(Error::CorruptPatch(
                "control/diff section lengths exceed patch size".into(),
            ));
        }

        let control_sub: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(SubStream::new(
            stream.clone(),
            control_start,
            control_end,
        )?));
        let diff_sub: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(SubStream::new(
            stream.clone(),
            control_end,
            diff_end,
        )?));
        let extra_sub: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(SubStream::new(
            stream.clone(),
            diff_end,
            total_len,
        )?));

        let control_dec = crate::codec::new_decompressor(control_sub);
        let diff_dec = crate::codec::new_decompressor(diff_sub);
        let extra_dec = crate::codec::new_decompressor(extra_sub);

        Ok(PatchPacker {
            stream,
            state: State::Read(ReadState {
                new_size,
                control_dec,
                diff_dec,
                extra_dec,
                remaining_diff: 0,
                remaining_extra: 0,
            }),
        })
    }

    fn write_state(&mut self) -> Result<&mut WriteState> {
        match &mut self.state {
            State::Write(w) => Ok(w),
            State::Read(_) => Err(Error::InvalidArg("packer is in read mode".into())),
        }
    }

    fn read_state(&mut self) -> Result<&mut ReadState> {
        match &mut self.state {
            State::Read(r) => Ok(r),
            State::Write(_) => Err(Error::InvalidArg("packer is in write mode".into())),
        }
    }

    /// Write mode: records the target new-file size and allocates the DIFF
    /// and EXTRA accumulators. Must be the first call on a write-mode packer.
    pub fn write_new_size(&mut self, size: i64) -> Result<()> {
        let w = self.write_state()?;
        if w.new_size != -1 {
            return Err(Error::InvalidArg("write_new_size called more than once".into()));
        }
        if size < 0 {
            return Err(Error::InvalidArg("new size must be non-negative".into()));
        }
        w.new_size = size;
        w.diff_buf = Vec::with_capacity((size as usize).saturating_add(1));
        w.extra_buf = Vec::with_capacity((size as usize).saturating_add(1));
        Ok(())
    }

    /// Write mode: emits one control triple. `diff`/`extra` must be
    /// non-negative; the following `write_entry_diff`/`write_entry_extra`
    /// calls must together supply exactly that many bytes.
    pub fn write_entry_header(&mut self, diff: i64, extra: i64, seek: i64) -> Result<()> {
        let w = self.write_state()?;
        if w.new_size < 0 {
            return Err(Error::InvalidArg("write_new_size must be called first".into()));
        }
        if diff < 0 || extra < 0 {
            return Err(Error::InvalidArg("entry diff/extra length must be non-negative".into()));
        }
        let mut buf = [0u8; 24];
        buf[0..8].copy_from_slice(&offset::encode(diff)?);
        buf[8..16].copy_from_slice(&offset::encode(extra)?);
        buf[16..24].copy_from_slice(&offset::encode(seek)?);
        w.control_enc.write(&buf)?;
        w.pending_diff = diff;
        w.pending_extra = extra;
        Ok(())
    }

    /// Write mode: appends `bytes` to the DIFF accumulator for the entry
    /// most recently opened by [`write_entry_header`](Self::write_entry_header).
    pub fn write_entry_diff(&mut self, bytes: &[u8]) -> Result<()> {
        let w = self.write_state()?;
        if bytes.len() as i64 > w.pending_diff {
            return Err(Error::InvalidArg("diff write exceeds entry's declared length".into()));
        }
        if w.diff_buf.len() as i64 + bytes.len() as i64 > w.new_size {
            return Err(Error::InvalidArg("diff accumulator would exceed new_size".into()));
        }
        w.diff_buf.extend_from_slice(bytes);
        w.pending_diff -= bytes.len() as i64;
        Ok(())
    }

    /// Write mode: appends `bytes` to the EXTRA accumulator for the entry
    /// most recently opened by [`write_entry_header`](Self::write_entry_header).
    pub fn write_entry_extra(&mut self, bytes: &[u8]) -> Result<()> {
        let w = self.write_state()?;
        if bytes.len() as i64 > w.pending_extra {
            return Err(Error::InvalidArg("extra write exceeds entry's declared length".into()));
        }
        if w.extra_buf.len() as i64 + bytes.len() as i64 > w.new_size {
            return Err(Error::InvalidArg("extra accumulator would exceed new_size".into()));
        }
        w.extra_buf.extend_from_slice(bytes);
        w.pending_extra -= bytes.len() as i64;
        Ok(())
    }

    /// Write mode: finalizes all three compressed sections and rewrites the
    /// 32-byte header with their true lengths.
    pub fn flush(&mut self) -> Result<()> {
        let w = self.write_state()?;
        if w.new_size < 0 {
            return Err(Error::InvalidArg("write_new_size must be called before flush".into()));
        }
        w.control_enc.flush()?;
        let control_end = self.stream.borrow_mut().tell()?;
        let control_len = control_end - HEADER_LEN;

        let diff_bytes = std::mem::take(&mut self.write_state()?.diff_buf);
        let mut diff_enc = crate::codec::new_compressor(self.stream.clone());
        diff_enc.write(&diff_bytes)?;
        diff_enc.flush()?;
        let diff_end = self.stream.borrow_mut().tell()?;
        let diff_len = diff_end - control_end;

        let extra_bytes = std::mem::take(&mut self.write_state()?.extra_buf);
        let mut extra_enc = crate::codec::new_compressor(self.stream.clone());
        extra_enc.write(&extra_bytes)?;
        extra_enc.flush()?;

        let mut header = [0u8; HEADER_LEN as usize];
        header[0..8].copy_from_slice(MAGIC);
        header[8..16].copy_from_slice(&offset::encode(control_len)?);
        header[16..24].copy_from_slice(&offset::encode(diff_len)?);
        header[24..32].copy_from_slice(&offset::encode(self.write_state()?.new_size)?);

        let mut stream = self.stream.borrow_mut();
        stream.seek(0, SeekOrigin::Set)?;
        stream.write(&header)?;
        stream.flush()?;
        Ok(())
    }

    /// Read mode: returns the new-file size recorded in the header. Always
    /// available immediately after [`PatchPacker::open`].
    pub fn read_new_size(&mut self) -> Result<i64> {
        Ok(self.read_state()?.new_size)
    }

    /// Read mode: reads the next control triple. Returns
    /// [`Error::EndOfFile`] once the control section is exhausted.
    pub fn read_entry_header(&mut self) -> Result<ControlEntry> {
        let r = self.read_state()?;
        let mut buf = [0u8; 24];
        let mut filled = 0;
        while filled < buf.len() {
            let n = r.control_dec.read(&mut buf[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Err(Error::EndOfFile);
                }
                return Err(Error::CorruptPatch("truncated control entry".into()));
            }
            filled += n;
        }
        let diff = offset::decode(buf[0..8].try_into().unwrap());
        let extra = offset::decode(buf[8..16].try_into().unwrap());
        let seek = offset::decode(buf[16..24].try_into().unwrap());
        if diff < 0 || extra < 0 {
            return Err(Error::CorruptPatch("negative entry length".into()));
        }
        r.remaining_diff = diff;
        r.remaining_extra = extra;
        Ok(ControlEntry { diff, extra, seek })
    }

    /// Read mode: reads up to `buf.len()` diff bytes for the current entry,
    /// clamped to the entry's declared diff length.
    pub fn read_entry_diff(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let r = self.read_state()?;
        if r.remaining_diff <= 0 {
            return Err(Error::EndOfFile);
        }
        let want = (buf.len() as i64).min(r.remaining_diff) as usize;
        let n = r.diff_dec.read(&mut buf[..want])?;
        r.remaining_diff -= n as i64;
        Ok(n)
    }

    /// Read mode: reads up to `buf.len()` extra bytes for the current
    /// entry, clamped to the entry's declared extra length.
    pub fn read_entry_extra(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let r = self.read_state()?;
        if r.remaining_extra <= 0 {
            return Err(Error::EndOfFile);
        }
        let want = (buf.len() as i64).min(r.remaining_extra) as usize;
        let n = r.extra_dec.read(&mut buf[..want])?;
        r.remaining_extra -= n as i64;
        Ok(n)
    }
}
