mod common;

use image_phash_core::algorithms::{dct_hash, mh_hash};
use image_phash_core::marshal::reverse_bytes;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use common::{create_test_images, test_phasher};

#[test]
fn test_concurrent_jobs_are_correlated_with_their_paths() {
    let dir = tempfile::tempdir().unwrap();
    let images = create_test_images(dir.path());
    let phasher = test_phasher();

    let paths = vec![
        images.textured.clone(),
        images.inverted.clone(),
        images.rings.clone(),
        images.missing.clone(),
        images.not_an_image.clone(),
    ];

    // Reference answers computed synchronously on this thread
    let expected: HashMap<PathBuf, Option<Vec<u8>>> = paths
        .iter()
        .map(|p| (p.clone(), dct_hash(p).ok().map(reverse_bytes)))
        .collect();

    let (tx, rx) = mpsc::channel();
    let mut submitted = 0;
    for round in 0..6 {
        for path in &paths {
            let tx = tx.clone();
            let tag = path.clone();
            phasher.image_hash(path, move |error, buffer, _| {
                tx.send((round, tag, error.is_none(), buffer)).unwrap();
            });
            submitted += 1;
        }
    }
    drop(tx);

    // Submission never blocks: every job is still owed a completion here
    assert_eq!(phasher.context().in_flight(), submitted);
    assert_eq!(phasher.run_until_idle(), submitted);

    let results: Vec<_> = rx.iter().collect();
    assert_eq!(results.len(), submitted);

    for (_, path, ok, buffer) in results {
        match &expected[&path] {
            Some(hash) => {
                assert!(ok, "{} failed", path.display());
                assert_eq!(&buffer, hash, "{}", path.display());
            }
            None => assert!(!ok, "{} succeeded", path.display()),
        }
    }
}

#[test]
fn test_mixed_entry_points_deliver_on_origin_thread() {
    let dir = tempfile::tempdir().unwrap();
    let images = create_test_images(dir.path());
    let phasher = test_phasher();
    let origin = thread::current().id();
    let (tx, rx) = mpsc::channel();

    let expected_mh = mh_hash(&images.textured, 2.0, 1.0).unwrap();

    for _ in 0..3 {
        let dct_tx = tx.clone();
        phasher.image_hash(&images.textured, move |error, _, _| {
            dct_tx
                .send(("dct", thread::current().id(), error.is_none(), Vec::new()))
                .unwrap();
        });
        let mh_tx = tx.clone();
        phasher.image_hash_mh(&images.textured, move |error, buffer| {
            mh_tx
                .send(("mh", thread::current().id(), error.is_none(), buffer))
                .unwrap();
        });
    }
    drop(tx);

    phasher.run_until_idle();

    let results: Vec<_> = rx.iter().collect();
    assert_eq!(results.len(), 6);
    for (entry, thread_id, ok, buffer) in results {
        assert_eq!(thread_id, origin);
        assert!(ok);
        if entry == "mh" {
            assert_eq!(buffer, expected_mh);
        }
    }
}
