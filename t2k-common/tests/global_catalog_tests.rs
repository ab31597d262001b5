//! Process-wide catalog tests
//!
//! Kept in their own test binary: the global cache can only be installed once
//! per process.

use std::sync::Arc;
use t2k_common::catalog::{self, CacheState};
use t2k_common::{sampling, Error, SampleQuery};
use tempfile::TempDir;

#[tokio::test]
async fn test_install_then_share_catalog() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("songs.json");
    std::fs::write(
        &path,
        r#"{
            "a": { "artist": "A", "title": "One", "previewUrl": "https://cdn.example/a.mp3", "positions": { "2023": 1 } },
            "b": { "artist": "B", "title": "Two", "previewUrl": "https://cdn.example/b.mp3", "positions": { "2023": 2 } }
        }"#,
    )
    .unwrap();

    let installed = catalog::install(&path).unwrap();
    assert_eq!(installed.path(), path.as_path());
    assert_eq!(catalog::global().state(), CacheState::Uninitialized);

    let first = catalog::get_catalog().await.unwrap();
    let second = catalog::get_catalog().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(catalog::global().load_count(), 1);

    let picked = sampling::sample(&SampleQuery::new(2).with_years(["2023"]))
        .await
        .unwrap();
    assert_eq!(picked.len(), 2);
    assert_eq!(catalog::global().load_count(), 1);

    let again = catalog::install(dir.path().join("other.json"));
    assert!(matches!(again, Err(Error::Config(_))));
    assert_eq!(catalog::global().path(), path.as_path());
}
