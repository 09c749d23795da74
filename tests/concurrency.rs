use std::fs;
use std::sync::Arc;
use std::thread;

use cuelite::{Client, ExportRequest};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SINGLE_DIGEST: &str = "715eda0e975747591d5ed7b5d40c9d95183397598e42023fcc2eeb2ff8e69a24";

/// Fan out identical requests across threads sharing one client. Every
/// request must come back byte-identical to a sequential run; the client's
/// lock is what keeps concurrent load+build cycles from interleaving.
#[test]
fn concurrent_identical_requests_agree() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("hello.cue"), "Hello: \", World!\"\n").unwrap();

    let client = Arc::new(Client::new());
    let request = ExportRequest {
        dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };

    let sequential = cuelite::export::export(&client, &request).unwrap();
    assert_eq!(sequential.id, SINGLE_DIGEST);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            let request = request.clone();
            thread::spawn(move || cuelite::export::export(&client, &request).unwrap())
        })
        .collect();

    for handle in handles {
        let out = handle.join().unwrap();
        assert_eq!(out, sequential);
    }
}

/// Concurrent requests over different inputs stay isolated: each result
/// matches its own input, never another request's.
#[test]
fn concurrent_distinct_requests_stay_isolated() {
    let client = Arc::new(Client::new());

    let dirs: Vec<TempDir> = (0..4)
        .map(|i| {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("n.cue"), format!("N: {i}\n")).unwrap();
            dir
        })
        .collect();

    let handles: Vec<_> = dirs
        .iter()
        .enumerate()
        .map(|(i, dir)| {
            let client = Arc::clone(&client);
            let request = ExportRequest {
                dir: Some(dir.path().to_path_buf()),
                ..Default::default()
            };
            thread::spawn(move || (i, cuelite::export::export(&client, &request).unwrap()))
        })
        .collect();

    for handle in handles {
        let (i, out) = handle.join().unwrap();
        assert_eq!(out.rendered, format!("{{\"N\":{i}}}"));
    }
}
