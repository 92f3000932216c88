//! Streaming 64-bit hash over a bounded file prefix.
//!
//! # Overview
//!
//! This is the "quick hash" half of the fingerprint: an xxHash64-shaped
//! block mixer run over at most the first [`HASH_WINDOW`] bytes of a file.
//! It trades cryptographic strength for speed — the fingerprint design
//! accepts that two files agreeing on this prefix hash (plus device, size,
//! and the four positional samples) are declared duplicates without reading
//! the rest of their contents.
//!
//! # Word order
//!
//! Input words are decoded as **little-endian** (`u64::from_le_bytes` /
//! `u32::from_le_bytes`). This is a fixed, documented interpretation: the
//! hash is a single-run heuristic, not a portable wire format, but the
//! decoding must not silently depend on the host byte order.

/// Number of prefix bytes folded into the quick hash.
pub const HASH_WINDOW: usize = 4096;

// Multiplicative primes, shared with the signature table hash.
pub(crate) const PRIME64_1: u64 = 0x9E37_79B1_85EB_CA87;
pub(crate) const PRIME64_2: u64 = 0xC2B2_AE3D_27D4_EB4F;
pub(crate) const PRIME64_3: u64 = 0x1656_67B1_9E37_79F9;
pub(crate) const PRIME64_4: u64 = 0x85EB_CA77_C2B2_AE63;
pub(crate) const PRIME64_5: u64 = 0x27D4_EB2F_1656_67C5;

#[inline]
fn read_u64(bytes: &[u8]) -> u64 {
    u64::from_le_bytes(bytes[..8].try_into().unwrap())
}

#[inline]
fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes[..4].try_into().unwrap())
}

#[inline]
fn round(acc: u64, word: u64) -> u64 {
    acc.wrapping_add(word.wrapping_mul(PRIME64_2))
        .rotate_left(31)
        .wrapping_mul(PRIME64_1)
}

#[inline]
fn merge_lane(hash: u64, lane: u64) -> u64 {
    let folded = lane
        .wrapping_mul(PRIME64_2)
        .rotate_left(31)
        .wrapping_mul(PRIME64_1);
    (hash ^ folded).wrapping_mul(PRIME64_1).wrapping_add(PRIME64_4)
}

/// Compute the 64-bit quick hash of a byte buffer.
///
/// Deterministic and pure: the same bytes always produce the same value.
/// Callers are expected to pass at most the first [`HASH_WINDOW`] bytes of
/// a file, but the function itself accepts any length.
#[must_use]
pub fn quick_hash(data: &[u8]) -> u64 {
    let len = data.len();
    let mut rest = data;

    let mut h64 = if len >= 32 {
        // Four parallel accumulator lanes, 32 bytes per block.
        let mut v1 = PRIME64_1.wrapping_add(PRIME64_2);
        let mut v2 = PRIME64_2;
        let mut v3 = 0u64;
        let mut v4 = PRIME64_1.wrapping_neg();

        while rest.len() >= 32 {
            v1 = round(v1, read_u64(&rest[0..]));
            v2 = round(v2, read_u64(&rest[8..]));
            v3 = round(v3, read_u64(&rest[16..]));
            v4 = round(v4, read_u64(&rest[24..]));
            rest = &rest[32..];
        }

        let mut h = v1
            .rotate_left(1)
            .wrapping_add(v2.rotate_left(7))
            .wrapping_add(v3.rotate_left(12))
            .wrapping_add(v4.rotate_left(18));
        h = merge_lane(h, v1);
        h = merge_lane(h, v2);
        h = merge_lane(h, v3);
        h = merge_lane(h, v4);
        h
    } else {
        PRIME64_5
    };

    h64 = h64.wrapping_add(len as u64);

    while rest.len() >= 8 {
        let k1 = round(0, read_u64(rest));
        h64 = (h64 ^ k1)
            .rotate_left(27)
            .wrapping_mul(PRIME64_1)
            .wrapping_add(PRIME64_4);
        rest = &rest[8..];
    }

    if rest.len() >= 4 {
        h64 ^= u64::from(read_u32(rest)).wrapping_mul(PRIME64_1);
        h64 = h64.rotate_left(23).wrapping_mul(PRIME64_2).wrapping_add(PRIME64_3);
        rest = &rest[4..];
    }

    for &byte in rest {
        h64 ^= u64::from(byte).wrapping_mul(PRIME64_5);
        h64 = h64.rotate_left(11).wrapping_mul(PRIME64_1);
    }

    // Final avalanche.
    h64 ^= h64 >> 33;
    h64 = h64.wrapping_mul(PRIME64_2);
    h64 ^= h64 >> 29;
    h64 = h64.wrapping_mul(PRIME64_3);
    h64 ^= h64 >> 32;

    h64
}
