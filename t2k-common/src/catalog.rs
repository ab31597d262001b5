//! Chart catalog and its process-wide cache
//!
//! The dataset is read once per process and shared as an immutable
//! `Arc<Catalog>`. Loading goes through a single-flight guard: concurrent first
//! callers wait for the same in-flight load and all observe the same catalog.
//! A failed load is not cached, so the next caller retries it.
//!
//! # Lifecycle
//!
//! `Uninitialized` → `Loading` → `Ready`. A failed or abandoned load drops back
//! to `Uninitialized`. `Ready` is final for the life of the cache.
//!
//! # Usage
//!
//! ```no_run
//! # async fn run() -> t2k_common::Result<()> {
//! use t2k_common::catalog;
//!
//! catalog::install("data/songs.json")?;
//! let songs = catalog::get_catalog().await?;
//! println!("{} songs", songs.len());
//! # Ok(())
//! # }
//! ```

use once_cell::sync::OnceCell as GlobalCell;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::{resolve_dataset_path, TomlConfig};
use crate::song::{unique_map, Song};
use crate::{Error, Result};

/// All songs keyed by their dataset identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    songs: BTreeMap<String, Song>,
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let songs: BTreeMap<String, Song> = unique_map(deserializer)?;
        if songs.contains_key("") {
            return Err(de::Error::custom("empty song key"));
        }
        Ok(Self { songs })
    }
}

/// Build a catalog from in-memory songs
///
/// Unlike deserialization this does not validate: a repeated key replaces the
/// earlier song, and an empty key is accepted.
impl FromIterator<(String, Song)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, Song)>>(iter: I) -> Self {
        Self {
            songs: iter.into_iter().collect(),
        }
    }
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Song> {
        self.songs.get(key)
    }

    /// Songs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Song)> {
        self.songs.iter().map(|(key, song)| (key.as_str(), song))
    }

    /// Every year label that appears in any song's positions
    pub fn years(&self) -> BTreeSet<&str> {
        self.songs
            .values()
            .flat_map(|song| song.positions.keys().map(String::as_str))
            .collect()
    }
}

/// Read and parse a dataset file
///
/// # Errors
///
/// [`Error::LoadFailure`] if the file is missing, unreadable or not a
/// well-formed dataset.
pub async fn load_catalog(path: &Path) -> Result<Catalog> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::load_failure(path, e))?;

    serde_json::from_slice(&bytes).map_err(|e| Error::load_failure(path, e))
}

/// Observable lifecycle of a [`CatalogCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Loading,
    Ready,
}

/// Lazily loaded, never invalidated catalog
pub struct CatalogCache {
    path: PathBuf,
    cell: OnceCell<Arc<Catalog>>,
    loading: AtomicBool,
    loads: AtomicUsize,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
            loading: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    /// Dataset location this cache loads from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> CacheState {
        if self.cell.initialized() {
            CacheState::Ready
        } else if self.loading.load(Ordering::Acquire) {
            CacheState::Loading
        } else {
            CacheState::Uninitialized
        }
    }

    /// Number of physical load attempts made so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Acquire)
    }

    /// Get the catalog, loading it on first use
    ///
    /// Once loaded, every call returns a clone of the same `Arc` without
    /// touching storage.
    pub async fn get(&self) -> Result<Arc<Catalog>> {
        if let Some(catalog) = self.cell.get() {
            return Ok(Arc::clone(catalog));
        }

        let catalog = self.cell.get_or_try_init(|| self.load()).await?;
        Ok(Arc::clone(catalog))
    }

    async fn load(&self) -> Result<Arc<Catalog>> {
        let _loading = LoadingFlag::raise(&self.loading);
        self.loads.fetch_add(1, Ordering::AcqRel);

        let started = Instant::now();
        match load_catalog(&self.path).await {
            Ok(catalog) => {
                info!(
                    "Loaded {} songs from {} in {:?}",
                    catalog.len(),
                    self.path.display(),
                    started.elapsed()
                );
                Ok(Arc::new(catalog))
            }
            Err(e) => {
                error!("{}", e);
                Err(e)
            }
        }
    }
}

/// Clears the loading flag when the load finishes or its future is dropped
struct LoadingFlag<'a>(&'a AtomicBool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

static GLOBAL: GlobalCell<CatalogCache> = GlobalCell::new();

/// Install the process-wide cache for a dataset path
///
/// # Errors
///
/// [`Error::Config`] if a process-wide cache already exists, either from an
/// earlier `install` or from a call to [`global`].
pub fn install(path: impl Into<PathBuf>) -> Result<&'static CatalogCache> {
    GLOBAL.set(CatalogCache::new(path)).map_err(|rejected| {
        Error::Config(format!(
            "Catalog already installed; ignoring {}",
            rejected.path().display()
        ))
    })?;
    Ok(global())
}

/// Process-wide cache
///
/// Created from the resolved configuration on first use when nothing was
/// installed. That first call reads the platform TOML config with blocking
/// file I/O, once per process; services call [`install`] at startup instead.
pub fn global() -> &'static CatalogCache {
    GLOBAL.get_or_init(|| {
        let config = TomlConfig::load_or_default(None);
        CatalogCache::new(resolve_dataset_path(None, &config))
    })
}

/// Process-wide catalog, loaded on first use
pub async fn get_catalog() -> Result<Arc<Catalog>> {
    global().get().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, years: &[&str]) -> Song {
        let positions = years
            .iter()
            .map(|y| format!("\"{}\": 5", y))
            .collect::<Vec<_>>()
            .join(",");
        serde_json::from_str(&format!(
            r#"{{ "artist": "Artist", "title": "{}", "positions": {{ {} }} }}"#,
            title, positions
        ))
        .unwrap()
    }

    #[test]
    fn test_years_collects_all_labels() {
        let catalog: Catalog = [
            ("a".to_string(), song("A", &["2021", "2023"])),
            ("b".to_string(), song("B", &["1999"])),
            ("c".to_string(), song("C", &[])),
        ]
        .into_iter()
        .collect();

        let years: Vec<&str> = catalog.years().into_iter().collect();
        assert_eq!(years, vec!["1999", "2021", "2023"]);
    }

    #[test]
    fn test_iter_is_key_ordered() {
        let catalog: Catalog = [
            ("zz".to_string(), song("Z", &[])),
            ("aa".to_string(), song("A", &[])),
        ]
        .into_iter()
        .collect();

        let keys: Vec<&str> = catalog.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["aa", "zz"]);
    }

    #[test]
    fn test_from_iter_keeps_last_duplicate() {
        let catalog: Catalog = [
            ("x".to_string(), song("First", &[])),
            ("x".to_string(), song("Second", &[])),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("x").unwrap().title, "Second");
    }

    #[test]
    fn test_duplicate_song_key_rejected() {
        let json = r#"{
            "x": { "artist": "A", "title": "One", "positions": {} },
            "x": { "artist": "B", "title": "Two", "positions": {} }
        }"#;
        let err = serde_json::from_str::<Catalog>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate key `x`"));
    }

    #[test]
    fn test_empty_song_key_rejected() {
        let json = r#"{ "": { "artist": "A", "title": "T", "positions": {} } }"#;
        assert!(serde_json::from_str::<Catalog>(json).is_err());
    }

    #[test]
    fn test_non_object_dataset_rejected() {
        assert!(serde_json::from_str::<Catalog>("[1, 2, 3]").is_err());
    }

    #[tokio::test]
    async fn test_new_cache_is_uninitialized() {
        let cache = CatalogCache::new("/nonexistent/songs.json");
        assert_eq!(cache.state(), CacheState::Uninitialized);
        assert_eq!(cache.load_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_load_returns_to_uninitialized() {
        let cache = CatalogCache::new("/nonexistent/songs.json");

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, Error::LoadFailure { .. }));
        assert_eq!(cache.state(), CacheState::Uninitialized);
        assert_eq!(cache.load_count(), 1);
    }
}
