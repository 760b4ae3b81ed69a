//! The diffing half of the delta engine: builds a `BSDIFF40` patch that
//! turns `old` into `new`.
//!
//! Grounded on `examples/original_source/source/bsdiff.c`'s `bsdiff()`
//! (cross-checked against the alternate `examples/original_source/bsdiff_diff.c`,
//! which implements the same outer loop directly against libbz2 rather
//! than through a packer). Where those references write straight to a raw
//! header and compressor, this writes through [`crate::packer::PatchPacker`]'s
//! logical entry API so the container layout lives in exactly one place.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::packer::PatchPacker;
use crate::stream::Stream;
use crate::suffix_array::SuffixArray;

/// Builds a patch transforming `old` into `new`, writing the `BSDIFF40`
/// container to `patch_out` (which must be a write-mode stream).
pub fn diff(old: &[u8], new: &[u8], patch_out: Rc<RefCell<dyn Stream>>) -> Result<()> {
    log::debug!("building suffix array over {} old bytes", old.len());
    let sa = SuffixArray::build(old);
    let mut packer = PatchPacker::create(patch_out)?;
    packer.write_new_size(new.len() as i64)?;

    let mut scan = 0i64;
    let mut pos = 0i64;
    let mut len = 0i64;
    let mut lastscan = 0i64;
    let mut lastpos = 0i64;
    let mut lastoffset = 0i64;

    let oldsize = old.len() as i64;
    let newsize = new.len() as i64;

    while scan < newsize {
        let mut oldscore = 0i64;
        scan += len;
        let mut scsc = scan;

        while scan < newsize {
            let (p, l) = sa.search(old, &new[scan as usize..], 0, sa.len() as i64 - 1);
            pos = p;
            len = l;

            while scsc < scan + len {
                let old_idx = scsc + lastoffset;
                if old_idx >= 0 && old_idx < oldsize && old[old_idx as usize] == new[scsc as usize] {
                    oldscore += 1;
                }
                scsc += 1;
            }

            if (len == oldscore && len != 0) || len > oldscore + 8 {
                break;
            }

            if scan + lastoffset < oldsize {
                let old_idx = scan + lastoffset;
                if old_idx >= 0 && old[old_idx as usize] == new[scan as usize] {
                    oldscore -= 1;
                }
            }
            scan += 1;
        }

        if len != oldscore || scan == newsize {
            let mut s = 0i64;
            let mut sf = 0i64;
            let mut lenf = 0i64;
            let mut i = 0i64;
            while lastscan + i < scan && lastpos + i < oldsize {
                if old[(lastpos + i) as usize] == new[(lastscan + i) as usize] {
                    s += 1;
                }
                i += 1;
                if s * 2 - i > sf * 2 - lenf {
                    sf = s;
                    lenf = i;
                }
            }

            let mut lenb = 0i64;
            if scan < newsize {
                let mut s = 0i64;
                let mut sb = 0i64;
                let mut i = 1i64;
                while scan >= lastscan + i && pos >= i {
                    if old[(pos - i) as usize] == new[(scan - i) as usize] {
                        s += 1;
                    }
                    if s * 2 - i > sb * 2 - lenb {
                        sb = s;
                        lenb = i;
                    }
                    i += 1;
                }
            }

            if lastscan + lenf > scan - lenb {
                let overlap = lastscan + lenf - (scan - lenb);
                let mut s = 0i64;
                let mut ss = 0i64;
                let mut lens = 0i64;
                let mut i = 0i64;
                while i < overlap {
                    if new[(lastscan + lenf - overlap + i) as usize]
                        == old[(lastpos + lenf - overlap + i) as usize]
                    {
                        s += 1;
                    }
                    if new[(scan - lenb + i) as usize] == old[(pos - lenb + i) as usize] {
                        s -= 1;
                    }
                    if s > ss {
                        ss = s;
                        lens = i + 1;
                    }
                    i += 1;
                }
                lenf += lens - overlap;
                lenb -= lens;
            }

            let diff_len = lenf;
            let extra_len = (scan - lenb) - (lastscan + lenf);
            let seek = (pos - lenb) - (lastpos + lenf);
            log::trace!(
                "entry: diff={diff_len} extra={extra_len} seek={seek} at new[{lastscan}..]"
            );
            packer.write_entry_header(diff_len, extra_len, seek)?;

            if diff_len > 0 {
                let mut diff_bytes = vec![0u8; diff_len as usize];
                for k in 0..diff_len {
                    diff_bytes[k as usize] =
                        new[(lastscan + k) as usize].wrapping_sub(old[(lastpos + k) as usize]);
                }
                packer.write_entry_diff(&diff_bytes)?;
            }
            if extra_len > 0 {
                let start = (lastscan + lenf) as usize;
                let end = (scan - lenb) as usize;
                packer.write_entry_extra(&new[start..end])?;
            }

            lastscan = scan - lenb;
            lastpos = pos - lenb;
            lastoffset = pos - scan;
        }
    }

    packer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::apply;
    use crate::stream::MemoryStream;

    fn round_trip(old: &[u8], new: &[u8]) -> Vec<u8> {
        let patch_stream: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(MemoryStream::new_write()));
        diff(old, new, patch_stream.clone()).unwrap();
        let bytes = patch_stream.borrow().get_buffer().unwrap().to_vec();
        let patch_in: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(MemoryStream::from_bytes(bytes)));
        apply(old, patch_in).unwrap()
    }

    #[test]
    fn round_trips_empty_to_empty() {
        assert_eq!(round_trip(b"", b""), b"");
    }

    #[test]
    fn round_trips_empty_old() {
        assert_eq!(round_trip(b"", b"hello world"), b"hello world");
    }

    #[test]
    fn round_trips_empty_new() {
        assert_eq!(round_trip(b"hello world", b""), b"");
    }

    #[test]
    fn round_trips_identical_buffers() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(4);
        assert_eq!(round_trip(&data, &data), data);
    }

    #[test]
    fn round_trips_small_edit() {
        let old = b"the quick brown fox jumps over the lazy dog";
        let new = b"the quick brown fox leaps over the lazy dog";
        assert_eq!(round_trip(old, new), new);
    }

    #[test]
    fn round_trips_prefix_relationship() {
        let old = b"the quick brown fox";
        let new = b"the quick brown fox jumps over the lazy dog";
        assert_eq!(round_trip(old, new), new);
    }

    #[test]
    fn round_trips_appended_and_prepended_data() {
        let old = b"middle section unchanged across both files entirely".to_vec();
        let mut new = b"PREFIX-".to_vec();
        new.extend_from_slice(&old);
        new.extend_from_slice(b"-SUFFIX");
        assert_eq!(round_trip(&old, &new), new);
    }

    #[test]
    fn round_trips_large_random_data() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let old: Vec<u8> = (0..20_000).map(|_| rng.r#gen()).collect();
        let mut new = old.clone();
        for _ in 0..500 {
            let idx = rng.gen_range(0..new.len());
            new[idx] = rng.r#gen();
        }
        assert_eq!(round_trip(&old, &new), new);
    }

    #[test]
    fn round_trips_highly_repetitive_data() {
        let old = b"ab".repeat(5000);
        let new = b"abc".repeat(4000);
        assert_eq!(round_trip(&old, &new), new);
    }
}
