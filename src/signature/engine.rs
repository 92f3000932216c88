//! Fingerprint computation from positioned file reads.
//!
//! # Overview
//!
//! [`compute_signature`] opens a file read-only and performs exactly five
//! bounded reads: four 4-byte samples at strategic offsets (start, the two
//! interior thirds, and the tail), then up to [`HASH_WINDOW`] bytes from
//! offset 0 for the quick hash. Total I/O is sub-file-size and independent
//! of how large the file is.
//!
//! Every read is positioned, and the function holds no shared state, so
//! concurrent signature computation across many files is safe without
//! coordination.
//!
//! Each sample read must yield exactly 4 bytes or the whole computation
//! fails — a partially populated signature never escapes. Files smaller
//! than 4 bytes therefore always report
//! [`SignatureError::ShortSample`].

use std::fs::File;
use std::io;
use std::path::Path;

use super::quick_hash::{quick_hash, HASH_WINDOW};
use super::{FileSignature, SignatureError, SAMPLE_COUNT, SAMPLE_WIDTH};

/// Compute the byte offsets of the four positional samples.
///
/// Offsets are {0, size/3, 2·size/3, size−4}, with the tail offset clamped
/// to 0 for files of 4 bytes or fewer.
#[must_use]
pub fn sample_offsets(size: u64) -> [u64; SAMPLE_COUNT] {
    [0, size / 3, (size * 2) / 3, size.saturating_sub(SAMPLE_WIDTH)]
}

/// Compute a file's signature.
///
/// `device` and `size` come from the caller's metadata lookup; the engine
/// trusts them rather than re-statting the file.
///
/// # Errors
///
/// Any failure — open, a short sample read, a failed prefix read — yields a
/// [`SignatureError`] and no signature. All are non-fatal to a scan: the
/// caller skips the file.
pub fn compute_signature(
    path: &Path,
    device: u64,
    size: u64,
) -> Result<FileSignature, SignatureError> {
    let file = File::open(path).map_err(|source| SignatureError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut samples = [0u32; SAMPLE_COUNT];
    for (sample, &offset) in samples.iter_mut().zip(&sample_offsets(size)) {
        let mut word = [0u8; SAMPLE_WIDTH as usize];
        match read_exact_at(&file, &mut word, offset) {
            Ok(()) => *sample = u32::from_le_bytes(word),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(SignatureError::ShortSample {
                    path: path.to_path_buf(),
                    offset,
                });
            }
            Err(source) => {
                return Err(SignatureError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    // Hash window: first min(size, 4096) bytes. A short count here is not
    // an error; the hash covers whatever was actually read, like the
    // samples it reflects the file as it exists right now.
    let window = size.min(HASH_WINDOW as u64) as usize;
    let mut buf = vec![0u8; window];
    let n = read_at_most(&file, &mut buf, 0).map_err(|source| SignatureError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(FileSignature {
        device,
        size,
        samples,
        quick_hash: quick_hash(&buf[..n]),
    })
}

/// Positioned read of exactly `buf.len()` bytes at `offset`.
#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

/// Positioned read of exactly `buf.len()` bytes at `offset`.
#[cfg(windows)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    let mut read = 0;
    while read < buf.len() {
        let n = file.seek_read(&mut buf[read..], offset + read as u64)?;
        if n == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        read += n;
    }
    Ok(())
}

/// Positioned read of up to `buf.len()` bytes at `offset`.
///
/// Returns the number of bytes actually read, which may be short if the
/// file ends first.
#[cfg(unix)]
fn read_at_most(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    let mut read = 0;
    while read < buf.len() {
        match file.read_at(&mut buf[read..], offset + read as u64) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}

/// Positioned read of up to `buf.len()` bytes at `offset`.
#[cfg(windows)]
fn read_at_most(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    let mut read = 0;
    while read < buf.len() {
        match file.seek_read(&mut buf[read..], offset + read as u64) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}
