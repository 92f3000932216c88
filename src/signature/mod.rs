//! File fingerprints built from positional samples and a prefix hash.
//!
//! # Overview
//!
//! A [`FileSignature`] is a cheap probabilistic stand-in for a file's full
//! content: the device it lives on, its exact size, four 32-bit words read
//! at strategic offsets, and a 64-bit hash of the first 4 KiB. Computing one
//! costs a single open plus five small positioned reads, regardless of file
//! size.
//!
//! Two signatures match only when *every* field is equal — there is no
//! fuzzy or partial matching. A match is treated as sufficient evidence of
//! duplication; see [`pipeline`](crate::pipeline) for the opt-in
//! byte-for-byte verification pass.
//!
//! # Accepted false positives
//!
//! Content that differs only outside the four sample offsets and outside
//! the hashed 4 KiB prefix produces identical signatures. This is a
//! documented property of the design, not a bug.

pub mod engine;
pub mod quick_hash;

use std::path::PathBuf;

pub use engine::compute_signature;
pub use quick_hash::{quick_hash, HASH_WINDOW};

use quick_hash::PRIME64_1;

/// Number of positional samples taken per file.
pub const SAMPLE_COUNT: usize = 4;

/// Width of each positional sample in bytes.
pub const SAMPLE_WIDTH: u64 = 4;

/// Golden-ratio-derived odd constant used to salt the table hash.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Errors from signature computation.
///
/// All variants mean the same thing to a scan: the file's fingerprint is
/// unavailable and the file must be excluded from duplicate grouping for
/// this run. None of them are fatal to the overall scan.
#[derive(thiserror::Error, Debug)]
pub enum SignatureError {
    /// The file could not be opened for reading.
    #[error("cannot open {path}: {source}")]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A positioned 4-byte sample read returned fewer than 4 bytes.
    ///
    /// Files smaller than 4 bytes always fail this way: even the
    /// degenerate offset-zero sample cannot be satisfied.
    #[error("short sample read at offset {offset} in {path}")]
    ShortSample {
        /// Path being fingerprinted
        path: PathBuf,
        /// Byte offset of the failed sample
        offset: u64,
    },

    /// Reading the hash-window prefix failed.
    #[error("cannot read hash window of {path}: {source}")]
    Read {
        /// Path being fingerprinted
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Fixed-size fingerprint of a file.
///
/// Immutable once computed. Either consumed by the
/// [`SignatureIndex`](crate::index::SignatureIndex) (ownership transfers on
/// successful insertion) or handed back to the caller when a match is found.
///
/// Sample words and the quick hash decode file bytes as little-endian; when
/// a sample is widened to 64 bits for hashing it is zero-extended.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileSignature {
    /// Identifier of the device/filesystem the file resides on.
    ///
    /// Prevents cross-device false matches where inode or size reuse is
    /// possible.
    pub device: u64,
    /// Exact file size in bytes at signature time.
    pub size: u64,
    /// Four 32-bit words read at offsets {0, size/3, 2·size/3, size−4}.
    pub samples: [u32; SAMPLE_COUNT],
    /// Quick hash of the first `min(size, 4096)` bytes.
    pub quick_hash: u64,
}

impl FileSignature {
    /// Exact equality check, cheapest-reject-first.
    ///
    /// Compares device, then size, then quick hash, then the four samples.
    /// Equivalent to `self == other`; spelled out so the rejection order is
    /// explicit and cheap fields short-circuit before the sample words.
    #[must_use]
    pub fn matches(&self, other: &FileSignature) -> bool {
        self.device == other.device
            && self.size == other.size
            && self.quick_hash == other.quick_hash
            && self.samples == other.samples
    }

    /// Hash of the whole signature, for bucket placement.
    ///
    /// Pure function of the fields. Load-bearing invariant: if
    /// `a.matches(&b)` then `a.table_hash() == b.table_hash()` — the
    /// converse need not hold.
    #[must_use]
    pub fn table_hash(&self) -> u64 {
        let mut h = self.size;
        h ^= self.device.wrapping_add(GOLDEN_GAMMA);
        h ^= self.quick_hash.wrapping_add(GOLDEN_GAMMA);
        for &sample in &self.samples {
            h ^= u64::from(sample).wrapping_mul(PRIME64_1);
            h = h.rotate_left(27);
        }
        h
    }
}
