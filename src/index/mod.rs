//! Hash-indexed store of file signatures.
//!
//! # Overview
//!
//! [`SignatureIndex`] is a fixed-bucket hash table keyed by
//! [`FileSignature::table_hash`]. Lookups and inserts resolve collisions by
//! exact signature equality. The bucket count is chosen once at
//! construction and never changes — sizing relative to the expected corpus
//! is the caller's job.
//!
//! Ownership is explicit: [`SignatureIndex::insert_or_find`] consumes the
//! signature only when no match exists. On a match the signature is handed
//! back inside [`InsertOutcome::Match`], so the caller can reuse or drop it.
//!
//! # Thread Safety
//!
//! The index is NOT internally synchronized. Callers needing concurrent
//! scanning must shard one index per worker or serialize access externally;
//! see [`pipeline`](crate::pipeline) for the channel-fed single-consumer
//! arrangement this crate uses.

use std::collections::TryReserveError;
use std::path::{Path, PathBuf};

use crate::signature::FileSignature;

/// Clone id value meaning "no clone group attached yet".
///
/// Never a real clone id; [`SignatureIndex::has_clone_id`] rejects it
/// unconditionally.
pub const CLONE_ID_UNASSIGNED: u64 = 0;

/// Errors from index construction and insertion.
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// Memory for the bucket array or a new entry could not be obtained.
    ///
    /// Distinct from both `Match` and `Inserted`: a caller must never
    /// mistake a failed insert for a successfully recorded unique file.
    #[error("signature index allocation failed: {0}")]
    AllocationFailed(#[from] TryReserveError),
}

/// One stored fingerprint: the owned signature, the path that produced it,
/// and its clone-group id.
#[derive(Debug)]
pub struct IndexEntry {
    signature: FileSignature,
    /// Path of the first file recorded with this signature.
    pub path: PathBuf,
    /// Caller-assigned clone group id; [`CLONE_ID_UNASSIGNED`] until a
    /// second file with the same signature shows up.
    pub clone_id: u64,
}

impl IndexEntry {
    /// The stored signature.
    ///
    /// Read-only: mutating a stored signature would invalidate its bucket
    /// placement.
    #[must_use]
    pub fn signature(&self) -> &FileSignature {
        &self.signature
    }
}

/// Outcome of [`SignatureIndex::insert_or_find`].
#[derive(Debug)]
pub enum InsertOutcome<'a> {
    /// An entry with a matching signature already exists.
    ///
    /// The entry is borrowed mutably so the caller can attach a clone id.
    /// The passed-in signature was not stored and is returned here —
    /// ownership stays with the caller.
    Match {
        /// The previously stored entry
        entry: &'a mut IndexEntry,
        /// The signature the caller passed in, handed back unstored
        signature: FileSignature,
    },
    /// No match existed; the index took ownership of the signature and
    /// recorded a new entry.
    Inserted,
}

impl InsertOutcome<'_> {
    /// Whether this outcome is a match against an existing entry.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, InsertOutcome::Match { .. })
    }
}

/// Fixed-bucket signature table with per-bucket collision chains.
#[derive(Debug)]
pub struct SignatureIndex {
    /// Collision chains. Entries append at the tail; lookups walk in
    /// reverse so observable resolution order stays most-recent-first,
    /// matching head insertion into a linked chain.
    buckets: Vec<Vec<IndexEntry>>,
    entry_count: usize,
}

impl SignatureIndex {
    /// Create an index with `bucket_count` buckets.
    ///
    /// The count is fixed for the index's lifetime; there is no rehashing
    /// or growth. Choose it relative to the expected number of unique
    /// files. Any non-zero count works — no power-of-two shape is assumed.
    ///
    /// # Errors
    ///
    /// [`IndexError::AllocationFailed`] if the bucket array cannot be
    /// allocated; no partial structure is left behind.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn new(bucket_count: usize) -> Result<Self, IndexError> {
        assert!(bucket_count > 0, "bucket_count must be non-zero");
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(bucket_count)?;
        buckets.resize_with(bucket_count, Vec::new);
        Ok(Self {
            buckets,
            entry_count: 0,
        })
    }

    /// Number of buckets, as fixed at construction.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Find an existing entry matching `signature`, or insert a new one.
    ///
    /// On a match the existing entry is returned along with the unstored
    /// signature ([`InsertOutcome::Match`]); on no match the signature and
    /// a copy of `path` are stored under `clone_id` and
    /// [`InsertOutcome::Inserted`] is returned.
    ///
    /// # Errors
    ///
    /// [`IndexError::AllocationFailed`] if the new entry cannot be
    /// allocated. The signature is dropped in that case and nothing was
    /// recorded.
    pub fn insert_or_find(
        &mut self,
        signature: FileSignature,
        path: &Path,
        clone_id: u64,
    ) -> Result<InsertOutcome<'_>, IndexError> {
        let idx = (signature.table_hash() % self.buckets.len() as u64) as usize;

        // Most-recent-first walk of the collision chain.
        let found = self.buckets[idx]
            .iter()
            .rposition(|entry| entry.signature.matches(&signature));
        if let Some(pos) = found {
            return Ok(InsertOutcome::Match {
                entry: &mut self.buckets[idx][pos],
                signature,
            });
        }

        let bucket = &mut self.buckets[idx];
        bucket.try_reserve(1)?;
        bucket.push(IndexEntry {
            signature,
            path: path.to_path_buf(),
            clone_id,
        });
        self.entry_count += 1;
        Ok(InsertOutcome::Inserted)
    }

    /// Whether any stored entry carries the given clone id.
    ///
    /// Always `false` for [`CLONE_ID_UNASSIGNED`]. Otherwise a full linear
    /// scan over every bucket — O(total entries), retained deliberately; an
    /// auxiliary id set could remove the cost at the price of extra
    /// bookkeeping.
    #[must_use]
    pub fn has_clone_id(&self, clone_id: u64) -> bool {
        if clone_id == CLONE_ID_UNASSIGNED {
            return false;
        }
        self.entries().any(|entry| entry.clone_id == clone_id)
    }

    /// Number of stored entries. O(1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry_count
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Total excess chain length across all buckets.
    ///
    /// Each bucket contributes `max(chain_length − 1, 0)`. A diagnostic
    /// measure of hash distribution quality, not used for correctness.
    #[must_use]
    pub fn collisions(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.len().saturating_sub(1))
            .sum()
    }

    /// Iterate over all stored entries, bucket by bucket.
    ///
    /// Order within a bucket is most-recent-first; order across buckets is
    /// unspecified.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.buckets.iter().flat_map(|bucket| bucket.iter().rev())
    }
}
