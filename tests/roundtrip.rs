//! End-to-end integration tests exercising the crate's public `diff`/`apply`
//! entry points through on-disk files, matching the end-to-end scenarios
//! a `bsdiff`/`bspatch` CLI round-trip would cover.

use std::cell::RefCell;
use std::rc::Rc;

use bsdelta::stream::{FileStream, MemoryStream, Stream};
use bsdelta::{Error, apply, diff};

fn memory_round_trip(old: &[u8], new: &[u8]) -> Vec<u8> {
    let patch: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(MemoryStream::new_write()));
    diff(old, new, patch.clone()).expect("diff failed");
    let patch_bytes = patch.borrow().get_buffer().unwrap().to_vec();
    let patch_in: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(MemoryStream::from_bytes(patch_bytes)));
    apply(old, patch_in).expect("apply failed")
}

fn file_round_trip(old: &[u8], new: &[u8]) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let patch_path = dir.path().join("delta.patch");

    let patch_out: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(
        FileStream::open_write(&patch_path).expect("open patch for write"),
    ));
    diff(old, new, patch_out).expect("diff failed");

    let patch_in: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(
        FileStream::open_read(&patch_path).expect("open patch for read"),
    ));
    apply(old, patch_in).expect("apply failed")
}

#[test]
fn empty_old_and_empty_new() {
    assert_eq!(memory_round_trip(b"", b""), b"");
    assert_eq!(file_round_trip(b"", b""), b"");
}

#[test]
fn empty_old_nonempty_new() {
    let new = b"freshly created content with no prior old file".to_vec();
    assert_eq!(memory_round_trip(b"", &new), new);
}

#[test]
fn nonempty_old_empty_new() {
    assert_eq!(memory_round_trip(b"some content that gets deleted entirely", b""), b"");
}

#[test]
fn old_equals_new() {
    let data = b"unchanged content repeated a few times unchanged content".repeat(3);
    assert_eq!(memory_round_trip(&data, &data), data);
}

#[test]
fn new_is_old_with_prefix_relationship() {
    let old = b"a shared prefix that both files start with".to_vec();
    let mut new = old.clone();
    new.extend_from_slice(b" and then this new file keeps going further");
    assert_eq!(memory_round_trip(&old, &new), new);
}

#[test]
fn single_byte_diff_in_the_middle() {
    let mut old = b"0123456789abcdefghijklmnopqrstuvwxyz".to_vec();
    let mut new = old.clone();
    new[10] = b'X';
    assert_eq!(memory_round_trip(&old, &new), new);
    old[20] = b'Y';
    assert_eq!(memory_round_trip(&old, &new.clone()), new);
}

#[test]
fn large_random_buffers_with_scattered_edits() {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let old: Vec<u8> = (0..1_048_576).map(|_| rng.r#gen()).collect();
    let mut new = old.clone();
    for _ in 0..20 {
        let idx = rng.gen_range(0..new.len());
        new[idx] = rng.r#gen();
    }
    assert_eq!(file_round_trip(&old, &new), new);
}

#[test]
fn highly_repetitive_buffers() {
    let old = b"0123456789".repeat(10_000);
    let new = b"01234".repeat(25_000);
    assert_eq!(memory_round_trip(&old, &new), new);
}

#[test]
fn patch_is_small_for_closely_related_inputs() {
    let old: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    let mut new = old.clone();
    new.push(b'!');
    let patch: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(MemoryStream::new_write()));
    diff(&old, &new, patch.clone()).unwrap();
    let patch_len = patch.borrow().get_buffer().unwrap().len();
    assert!(
        patch_len < old.len() / 10,
        "patch ({patch_len} bytes) should be far smaller than the input for a single appended byte"
    );
}

#[test]
fn corrupt_header_is_rejected_as_corrupt_patch_not_a_panic() {
    let patch: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(MemoryStream::new_write()));
    diff(b"old content", b"new content", patch.clone()).unwrap();
    let mut bytes = patch.borrow().get_buffer().unwrap().to_vec();
    bytes[3] ^= 0xff; // flip a byte inside the magic

    let patch_in: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(MemoryStream::from_bytes(bytes)));
    assert!(matches!(apply(b"old content", patch_in), Err(Error::CorruptPatch(_))));
}

#[test]
fn corrupt_length_field_is_rejected() {
    let patch: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(MemoryStream::new_write()));
    diff(b"some old data here", b"some new data there", patch.clone()).unwrap();
    let mut bytes = patch.borrow().get_buffer().unwrap().to_vec();
    // Flip the sign bit of the control-block length field (header bytes 8..16).
    bytes[15] |= 0x80;

    let patch_in: Rc<RefCell<dyn Stream>> = Rc::new(RefCell::new(MemoryStream::from_bytes(bytes)));
    assert!(apply(b"some old data here", patch_in).is_err());
}
