//! The patch-application half of the delta engine: reconstructs `new` from
//! `old` plus a `BSDIFF40` patch.
//!
//! Grounded on `examples/original_source/source/bspatch.c`'s `bspatch()`.
//! That function reads its three substreams through the reference's own
//! sub-stream/decompressor plumbing; this reads the same three logical
//! pieces of an entry through [`crate::packer::PatchPacker`] instead.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::packer::PatchPacker;
use crate::stream::Stream;

/// Applies `patch_in` (a read-mode stream holding a `BSDIFF40` container)
/// against `old`, returning the reconstructed new file.
pub fn apply(old: &[u8], patch_in: Rc<RefCell<dyn Stream>>) -> Result<Vec<u8>> {
    let mut packer = PatchPacker::open(patch_in)?;
    let newsize = packer.read_new_size()?;
    let oldsize = old.len() as i64;

    let mut new = vec![0u8; newsize as usize];
    let mut oldpos = 0i64;
    let mut newpos = 0i64;

    while newpos < newsize {
        let entry = match packer.read_entry_header() {
            Ok(e) => e,
            Err(Error::EndOfFile) => {
                return Err(Error::CorruptPatch(
                    "control section exhausted before new file was fully reconstructed".into(),
                ));
            }
            Err(e) => return Err(e),
        };

        if newpos + entry.diff > newsize || entry.diff < 0 {
            return Err(Error::CorruptPatch("diff length runs past new file size".into()));
        }
        read_entry_bytes(&mut packer, true, &mut new[newpos as usize..(newpos + entry.diff) as usize])?;
        for i in 0..entry.diff {
            let oi = oldpos + i;
            if oi >= 0 && oi < oldsize {
                let idx = (newpos + i) as usize;
                new[idx] = new[idx].wrapping_add(old[oi as usize]);
            }
        }
        newpos += entry.diff;
        oldpos += entry.diff;

        if newpos + entry.extra > newsize || entry.extra < 0 {
            return Err(Error::CorruptPatch("extra length runs past new file size".into()));
        }
        read_entry_bytes(&mut packer, false, &mut new[newpos as usize..(newpos + entry.extra) as usize])?;
        newpos += entry.extra;
        oldpos += entry.seek;
    }

    Ok(new)
}

fn read_entry_bytes(packer: &mut PatchPacker, diff: bool, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = if diff {
            packer.read_entry_diff(&mut buf[filled..])?
        } else {
            packer.read_entry_extra(&mut buf[filled..])?
        };
        if n == 0 {
            return Err(Error::CorruptPatch("entry data shorter than declared length".into()));
        }
        filled += n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use crate::stream::MemoryStream;

    fn make_patch(old: &[u8], new: &[u8]) -> Vec<u8> {
        let patch_stream: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(MemoryStream::new_write()));
        diff(old, new, patch_stream.clone()).unwrap();
        patch_stream.borrow().get_buffer().unwrap().to_vec()
    }

    #[test]
    fn applies_a_well_formed_patch() {
        let old = b"the quick brown fox jumps over the lazy dog";
        let new = b"the quick brown fox leaps over the lazy dog";
        let patch_bytes = make_patch(old, new);
        let patch_in: Rc<RefCell<dyn Stream>> =
            Rc::new(RefCell::new(MemoryStream::from_bytes(patch_bytes)));
        assert_eq!(apply(old, patch_in).unwrap(), new);
    }

    #[test]
    fn rejects_a_patch_with_bad_magic() {
        let mut patch_bytes = make_patch(b"old", b"new data");
        patch_bytes[0] = b'X';
        let patch_in: Rc<RefCell<dyn Stream>> =
            Rc::new(RefCell::new(MemoryStream::from_bytes(patch_bytes)));
        assert!(matches!(apply(b"old", patch_in), Err(Error::CorruptPatch(_))));
    }

    #[test]
    fn rejects_a_patch_truncated_mid_container() {
        let mut patch_bytes = make_patch(b"some old content here", b"some new content there");
        patch_bytes.truncate(patch_bytes.len() / 2);
        let patch_in: Rc<RefCell<dyn Stream>> =
            Rc::new(RefCell::new(MemoryStream::from_bytes(patch_bytes)));
        assert!(apply(b"some old content here", patch_in).is_err());
    }

    #[test]
    fn applying_against_the_wrong_old_file_does_not_panic() {
        let patch_bytes = make_patch(b"the original file contents", b"the modified file contents");
        let patch_in: Rc<RefCell<dyn Stream>> =
            Rc::new(RefCell::new(MemoryStream::from_bytes(patch_bytes)));
        // Either it reconstructs something (silently wrong) or it reports an
        // error; it must never index out of bounds.
        let _ = apply(b"totally unrelated old data of a different length!!", patch_in);
    }
}
