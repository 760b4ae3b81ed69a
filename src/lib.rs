//! # bsdelta
//!
//! A pure-Rust implementation of the `BSDIFF40` binary delta format: the
//! compact patch encoding popularized by Colin Percival's `bsdiff`/`bspatch`
//! tools, built around a suffix-array match finder and a pluggable
//! entropy coder (bzip2 by default).
//!
//! ## Quick Start
//!
//! ### Diffing two buffers
//!
//! ```rust,no_run
//! use bsdelta::{diff, Result};
//! use bsdelta::stream::Stream;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! fn main() -> Result<()> {
//!     let old = b"the quick brown fox jumps over the lazy dog";
//!     let new = b"the quick brown fox leaps over the lazy dog";
//!
//!     let patch = Rc::new(RefCell::new(bsdelta::stream::MemoryStream::new_write()));
//!     diff(old, new, patch.clone())?;
//!     let patch_bytes = patch.borrow().get_buffer().unwrap().to_vec();
//!     println!("patch is {} bytes", patch_bytes.len());
//!     Ok(())
//! }
//! ```
//!
//! ### Applying a patch
//!
//! ```rust,no_run
//! use bsdelta::{apply, Result};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! fn main() -> Result<()> {
//!     let old = b"the quick brown fox jumps over the lazy dog";
//!     let patch_bytes: Vec<u8> = vec![]; // loaded from disk in practice
//!     let patch_in = Rc::new(RefCell::new(
//!         bsdelta::stream::MemoryStream::from_bytes(patch_bytes),
//!     ));
//!     # if false {
//!     let new = apply(old, patch_in)?;
//!     println!("reconstructed {} bytes", new.len());
//!     # }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `bzip2` | Yes | BZip2 entropy coder for the three patch sections |
//! | `cli`   | No  | `bsdiff`/`bspatch` command-line binaries |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. [`Error::code`] mirrors the reference
//! implementation's numeric return codes, which is useful when reporting a
//! process exit code from the CLI binaries.
//!
//! ## Design
//!
//! The engine is organized the way the reference implementation is: a
//! [`Stream`](stream::Stream) abstraction hides whether bytes come from
//! memory, a file, or a sub-range of another stream; a
//! [`Compressor`](codec::Compressor)/[`Decompressor`](codec::Decompressor)
//! pair hides the entropy coder; [`PatchPacker`](packer::PatchPacker) hides
//! the three-section container layout behind a logical entry-at-a-time API;
//! and [`diff`]/[`apply`] implement the actual delta algorithm on top of
//! that plumbing. See `DESIGN.md` in the repository root for the full
//! grounding of each piece.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod codec;
pub mod diff;
pub mod error;
pub mod offset;
pub mod packer;
pub mod patch;
pub mod stream;
pub mod suffix_array;

pub use diff::diff;
pub use error::{Error, Result};
pub use packer::{ControlEntry, PatchPacker};
pub use patch::apply;
pub use suffix_array::SuffixArray;
