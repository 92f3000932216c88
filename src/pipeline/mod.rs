//! Scanning pipeline: walk, fingerprint in parallel, index serially.
//!
//! # Overview
//!
//! The fingerprint engine has no shared state, so signature computation
//! parallelizes freely; the index assumes exclusive access. The pipeline
//! therefore runs in two stages:
//!
//! 1. **Fingerprint stage**: a rayon pool computes signatures for every
//!    discovered file and sends them over a channel.
//! 2. **Index stage**: a single consumer receives signatures and calls
//!    [`SignatureIndex::insert_or_find`], assigning clone ids and building
//!    clone groups as matches arrive.
//!
//! A fingerprint failure skips the file (never fatal); an index insert
//! failure likewise skips the file and is logged, per the consumer
//! contract. Only index construction failure aborts the scan.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::index::{IndexError, InsertOutcome, SignatureIndex, CLONE_ID_UNASSIGNED};
use crate::signature::{compute_signature, FileSignature, SAMPLE_WIDTH};

/// Configuration for a scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of index buckets. Fixed for the scan; size it relative to the
    /// expected number of unique files.
    pub bucket_count: usize,
    /// Minimum file size to fingerprint, in bytes.
    ///
    /// Defaults to 4: smaller files can never satisfy a sample read.
    pub min_size: u64,
    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,
    /// Number of fingerprint threads. Low values reduce disk thrashing.
    pub threads: usize,
    /// Verify matches byte-for-byte before declaring a clone.
    ///
    /// Off by default: the signature design accepts a small false-positive
    /// risk in exchange for sub-file-size I/O. When enabled, a mismatch
    /// demotes the match and is counted in
    /// [`ScanStats::verification_rejects`].
    pub verify: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            bucket_count: 65_536,
            min_size: SAMPLE_WIDTH,
            skip_hidden: false,
            follow_symlinks: false,
            threads: 4,
            verify: false,
        }
    }
}

impl ScanConfig {
    /// Set the index bucket count.
    #[must_use]
    pub fn with_bucket_count(mut self, count: usize) -> Self {
        self.bucket_count = count.max(1);
        self
    }

    /// Set the minimum file size (clamped to the 4-byte sample width).
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size.max(SAMPLE_WIDTH);
        self
    }

    /// Set the fingerprint thread count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Enable or disable byte-for-byte match verification.
    #[must_use]
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

/// Errors that abort a scan before it can produce a report.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The index could not be constructed with the requested bucket count.
    #[error("cannot build signature index: {0}")]
    IndexConstruction(#[from] IndexError),

    /// The fingerprint thread pool could not be built.
    #[error("cannot build fingerprint thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A group of mutually-duplicate files.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CloneGroup {
    /// Clone id shared by every file in the group.
    pub clone_id: u64,
    /// Size of each file in the group, in bytes.
    pub size: u64,
    /// Member paths; the first is the file that was indexed first.
    pub paths: Vec<PathBuf>,
}

/// Counters accumulated over one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScanStats {
    /// Regular files encountered during traversal.
    pub files_seen: usize,
    /// Files below the minimum size, never fingerprinted.
    pub too_small: usize,
    /// Files whose fingerprint was unavailable (open/read failures).
    pub fingerprint_failures: usize,
    /// Files skipped because the index could not record them.
    pub index_failures: usize,
    /// Traversal errors (unreadable directories, dangling links).
    pub walk_errors: usize,
    /// Unique signatures recorded in the index.
    pub unique_files: usize,
    /// Files identified as clones of an indexed file.
    pub clone_files: usize,
    /// Number of clone groups.
    pub clone_groups: usize,
    /// Bytes occupied by redundant copies (group size × extra members).
    pub reclaimable_bytes: u64,
    /// Matches demoted by byte-for-byte verification.
    pub verification_rejects: usize,
    /// Bucket collision count reported by the index.
    pub index_collisions: usize,
}

/// Result of a completed scan.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanReport {
    /// Clone groups in discovery order.
    pub groups: Vec<CloneGroup>,
    /// Scan counters.
    pub stats: ScanStats,
}

/// A file queued for fingerprinting.
#[derive(Debug)]
struct FileTask {
    path: PathBuf,
    device: u64,
    size: u64,
}

/// Scan `roots` for duplicate files.
///
/// # Errors
///
/// Only index construction and thread-pool construction abort the scan;
/// per-file failures are counted in [`ScanStats`] and logged.
pub fn scan(roots: &[PathBuf], config: &ScanConfig) -> Result<ScanReport, ScanError> {
    let mut index = SignatureIndex::new(config.bucket_count)?;
    let mut stats = ScanStats::default();

    let tasks = collect_files(roots, config, &mut stats);
    log::info!(
        "discovered {} files to fingerprint across {} roots",
        tasks.len(),
        roots.len()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let fingerprint_failures = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(PathBuf, FileSignature)>();

    let mut groups: Vec<CloneGroup> = Vec::new();
    std::thread::scope(|scope| {
        let failures = &fingerprint_failures;
        scope.spawn(move || {
            pool.install(|| {
                tasks.into_par_iter().for_each_with(tx, |tx, task| {
                    match compute_signature(&task.path, task.device, task.size) {
                        Ok(sig) => {
                            // Receiver gone means the consumer bailed; stop quietly.
                            let _ = tx.send((task.path, sig));
                        }
                        Err(e) => {
                            log::warn!("skipping {}: {}", task.path.display(), e);
                            failures.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            });
        });

        // Serialized index stage: sole owner of the index.
        let mut next_clone_id: u64 = 1;
        for (path, sig) in rx {
            record(
                &mut index,
                &mut groups,
                &mut stats,
                &mut next_clone_id,
                path,
                sig,
                config.verify,
            );
        }
    });

    stats.fingerprint_failures = fingerprint_failures.into_inner();
    stats.unique_files = index.len();
    stats.clone_groups = groups.len();
    stats.index_collisions = index.collisions();
    Ok(ScanReport { groups, stats })
}

/// Feed one signature through the index and update clone bookkeeping.
fn record(
    index: &mut SignatureIndex,
    groups: &mut Vec<CloneGroup>,
    stats: &mut ScanStats,
    next_clone_id: &mut u64,
    path: PathBuf,
    sig: FileSignature,
    verify: bool,
) {
    let size = sig.size;
    match index.insert_or_find(sig, &path, CLONE_ID_UNASSIGNED) {
        Ok(InsertOutcome::Inserted) => {}
        Ok(InsertOutcome::Match { entry, .. }) => {
            if verify && !verified_identical(&entry.path, &path) {
                log::warn!(
                    "signature match rejected by verification: {} vs {}",
                    entry.path.display(),
                    path.display()
                );
                stats.verification_rejects += 1;
                return;
            }

            if entry.clone_id == CLONE_ID_UNASSIGNED {
                entry.clone_id = *next_clone_id;
                *next_clone_id += 1;
                groups.push(CloneGroup {
                    clone_id: entry.clone_id,
                    size,
                    paths: vec![entry.path.clone()],
                });
            }

            // Clone ids are assigned densely from 1, so they double as a
            // group position.
            let group = &mut groups[(entry.clone_id - 1) as usize];
            group.paths.push(path);
            stats.clone_files += 1;
            stats.reclaimable_bytes += size;
        }
        Err(e) => {
            log::error!("cannot record {}: {}", path.display(), e);
            stats.index_failures += 1;
        }
    }
}

/// Walk all roots and queue regular files that pass the filters.
fn collect_files(roots: &[PathBuf], config: &ScanConfig, stats: &mut ScanStats) -> Vec<FileTask> {
    let mut tasks = Vec::new();
    for root in roots {
        let walker = WalkDir::new(root)
            .follow_links(config.follow_symlinks)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !(config.skip_hidden && is_hidden(e.file_name())));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("walk error under {}: {}", root.display(), e);
                    stats.walk_errors += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            stats.files_seen += 1;

            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    log::warn!("no metadata for {}: {}", entry.path().display(), e);
                    stats.walk_errors += 1;
                    continue;
                }
            };
            let size = meta.len();
            if size < config.min_size {
                stats.too_small += 1;
                continue;
            }

            tasks.push(FileTask {
                path: entry.into_path(),
                device: device_of(&meta),
                size,
            });
        }
    }
    tasks
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

#[cfg(unix)]
fn device_of(meta: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.dev()
}

/// Device identity is unavailable outside Unix; every file reports device 0
/// and cross-device discrimination falls back to size/sample/hash fields.
#[cfg(not(unix))]
fn device_of(_meta: &std::fs::Metadata) -> u64 {
    0
}

/// Byte-for-byte comparison of two files.
///
/// Any I/O error counts as "not identical": when in doubt, do not declare a
/// clone.
fn verified_identical(a: &Path, b: &Path) -> bool {
    match compare_contents(a, b) {
        Ok(identical) => identical,
        Err(e) => {
            log::warn!(
                "verification read failed for {} / {}: {}",
                a.display(),
                b.display(),
                e
            );
            false
        }
    }
}

fn compare_contents(a: &Path, b: &Path) -> std::io::Result<bool> {
    const CHUNK: usize = 64 * 1024;
    let mut reader_a = BufReader::with_capacity(CHUNK, File::open(a)?);
    let mut reader_b = BufReader::with_capacity(CHUNK, File::open(b)?);
    let mut buf_a = vec![0u8; CHUNK];
    let mut buf_b = vec![0u8; CHUNK];

    loop {
        let n_a = read_full(&mut reader_a, &mut buf_a)?;
        let n_b = read_full(&mut reader_b, &mut buf_b)?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until the buffer is full or EOF; returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}
