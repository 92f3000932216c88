//! Integration tests for the signature index, driven through real files.

use std::fs;
use std::path::{Path, PathBuf};

use dupesig::index::{InsertOutcome, SignatureIndex};
use dupesig::signature::{compute_signature, FileSignature};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn synthetic(seed: u64) -> FileSignature {
    FileSignature {
        device: 1,
        size: 4096 + seed,
        samples: [seed as u32, (seed >> 8) as u32, (seed >> 16) as u32, !seed as u32],
        quick_hash: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15),
    }
}

#[test]
fn real_file_signatures_round_trip_through_index() {
    let dir = TempDir::new().unwrap();
    let content: Vec<u8> = (0..6000).map(|i| (i % 241) as u8).collect();
    let original = write_file(&dir, "original.bin", &content);
    let copy = write_file(&dir, "copy.bin", &content);
    let other = write_file(&dir, "other.bin", &vec![0x33u8; 6000]);

    let mut index = SignatureIndex::new(16).unwrap();

    let sig = compute_signature(&original, 1, 6000).unwrap();
    assert!(!index.insert_or_find(sig, &original, 0).unwrap().is_match());

    let sig = compute_signature(&other, 1, 6000).unwrap();
    assert!(!index.insert_or_find(sig, &other, 0).unwrap().is_match());
    assert_eq!(index.len(), 2);

    let sig = compute_signature(&copy, 1, 6000).unwrap();
    match index.insert_or_find(sig, &copy, 0).unwrap() {
        InsertOutcome::Match { entry, signature } => {
            assert_eq!(entry.path, original);
            // The unstored signature comes back to the caller intact.
            assert_eq!(signature.size, 6000);
        }
        InsertOutcome::Inserted => panic!("copy must match the original"),
    }
    assert_eq!(index.len(), 2);
}

#[test]
fn sixteen_bucket_end_to_end_scenario() {
    let mut index = SignatureIndex::new(16).unwrap();
    let first = synthetic(1);

    for (i, sig) in [first.clone(), synthetic(2), synthetic(3)].into_iter().enumerate() {
        let outcome = index
            .insert_or_find(sig, Path::new("/f"), 0)
            .unwrap();
        assert!(!outcome.is_match(), "insert {i} wrongly matched");
    }
    assert_eq!(index.len(), 3);

    match index.insert_or_find(first, Path::new("/dup"), 0).unwrap() {
        InsertOutcome::Match { entry, .. } => {
            assert!(entry.signature().matches(&synthetic(1)));
        }
        InsertOutcome::Inserted => panic!("fourth signature must match the first"),
    }
    assert_eq!(index.len(), 3);
}

#[test]
fn collision_accounting_attributes_shared_buckets() {
    // A single bucket guarantees every insert after the first collides.
    let mut index = SignatureIndex::new(1).unwrap();
    let k = 10;
    for seed in 0..k {
        index
            .insert_or_find(synthetic(seed), Path::new("/f"), 0)
            .unwrap();
    }
    assert_eq!(index.len(), k as usize);
    assert!(index.collisions() >= k as usize - 1);
}

#[test]
fn clone_id_sentinel_and_scan() {
    let mut index = SignatureIndex::new(8).unwrap();
    assert!(!index.has_clone_id(0), "sentinel must never be found in an empty index");

    index
        .insert_or_find(synthetic(1), Path::new("/a"), 0)
        .unwrap();
    index
        .insert_or_find(synthetic(2), Path::new("/b"), 5)
        .unwrap();

    assert!(!index.has_clone_id(0), "sentinel must never be found even when stored");
    assert!(index.has_clone_id(5));
    assert!(!index.has_clone_id(6));
}

#[test]
fn clone_id_assignment_through_match() {
    let mut index = SignatureIndex::new(8).unwrap();
    index
        .insert_or_find(synthetic(9), Path::new("/a"), 0)
        .unwrap();

    // The consumer pattern: second occurrence assigns a fresh id.
    match index
        .insert_or_find(synthetic(9), Path::new("/b"), 0)
        .unwrap()
    {
        InsertOutcome::Match { entry, .. } => {
            assert_eq!(entry.clone_id, 0);
            entry.clone_id = 1;
        }
        InsertOutcome::Inserted => panic!("expected match"),
    }
    assert!(index.has_clone_id(1));

    // Third occurrence sees the already-assigned id.
    match index
        .insert_or_find(synthetic(9), Path::new("/c"), 0)
        .unwrap()
    {
        InsertOutcome::Match { entry, .. } => assert_eq!(entry.clone_id, 1),
        InsertOutcome::Inserted => panic!("expected match"),
    }
}

#[test]
fn bucket_count_is_a_free_parameter() {
    // No power-of-two assumption: odd and prime counts behave identically.
    for bucket_count in [1usize, 3, 7, 16, 97] {
        let mut index = SignatureIndex::new(bucket_count).unwrap();
        for seed in 0..50 {
            index
                .insert_or_find(synthetic(seed), Path::new("/f"), 0)
                .unwrap();
        }
        assert_eq!(index.len(), 50, "bucket_count={bucket_count}");
        for seed in 0..50 {
            assert!(
                index
                    .insert_or_find(synthetic(seed), Path::new("/g"), 0)
                    .unwrap()
                    .is_match(),
                "bucket_count={bucket_count} seed={seed}"
            );
        }
    }
}
