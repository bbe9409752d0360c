//! Cache manager for persisting geocoding results to disk
//!
//! Provides a `CacheManager` that loads and saves the whole [`Cache`] snapshot
//! as a single JSON file. There is no incremental append: every save replaces
//! the previous snapshot.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use super::snapshot::{Cache, Section, CACHE_VERSION};
use crate::observer::{Event, LogObserver, Observer};

/// File name of the snapshot inside the cache directory
pub const CACHE_FILE: &str = "geocache_cache.json";

/// Errors that can occur when reading or writing the cache snapshot
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading, writing or deleting the snapshot failed
    #[error("Cache I/O error: {0}")]
    Io(#[from] io::Error),

    /// The snapshot exists but is not valid cache data
    #[error("Corrupt cache file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot was written with a schema this crate does not understand
    #[error("Unsupported cache version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Just enough of the snapshot to check its schema before a full parse
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Manages reading and writing the cache snapshot on disk
///
/// The snapshot lives in an XDG-compliant cache directory by default
/// (`~/.cache/geocache/` on Linux). The directory is created on first save.
#[derive(Clone)]
pub struct CacheManager {
    /// Directory where the snapshot is stored
    cache_dir: PathBuf,
    observer: Arc<dyn Observer>,
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "geocache")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            observer: Arc::new(LogObserver),
        }
    }

    /// Replaces the observer that receives store events
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the directory holding the snapshot
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path of the snapshot file
    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Loads the snapshot, or a fresh empty cache if none exists
    ///
    /// # Returns
    /// * `Ok(Cache)` with the stored data, or an empty versioned cache
    /// * `Err(CacheError)` if the file exists but cannot be read, parsed,
    ///   or carries a different schema version
    pub fn load(&self) -> Result<Cache, CacheError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.observer.notify(&Event::CacheCreated);
                return Ok(Cache::new());
            }
            Err(e) => return Err(e.into()),
        };

        self.observer.notify(&Event::CacheLoaded { path: &path });

        let probe: VersionProbe = serde_json::from_str(&content).map_err(|source| {
            CacheError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        if probe.version != CACHE_VERSION {
            return Err(CacheError::UnsupportedVersion {
                found: probe.version,
                expected: CACHE_VERSION,
            });
        }

        serde_json::from_str(&content).map_err(|source| CacheError::Corrupt { path, source })
    }

    /// Writes the full cache, replacing any previous snapshot
    pub fn save(&self, cache: &Cache) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let json = serde_json::to_string_pretty(cache)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let path = self.path();
        fs::write(&path, json)?;
        self.observer.notify(&Event::CacheWritten {
            path: &path,
            entries: cache.len(),
        });
        Ok(())
    }

    /// Deletes the snapshot; does nothing if there is none
    pub fn clear(&self) -> Result<(), CacheError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                self.observer.notify(&Event::CacheCleared { path: &path });
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes one entry from a section and persists the cache
    ///
    /// The cache is written even if `key` was not present.
    ///
    /// # Returns
    /// * `Ok(true)` if an entry was removed
    /// * `Ok(false)` if there was nothing to remove
    pub fn remove_entry(&self, key: &str, section: Section) -> Result<bool, CacheError> {
        let mut cache = self.load()?;
        let removed = cache.section_mut(section).remove(key).is_some();
        if removed {
            self.observer.notify(&Event::EntryRemoved { section, key });
        }
        self.save(&cache)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_match;
    use crate::observer::recording::{Recorded, RecordingObserver};
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    fn populated_cache() -> Cache {
        let mut cache = Cache::new();
        cache.log_request(Section::Geocoding, Utc::now());
        cache.geocoding.insert(
            "221B Baker Street, London".to_string(),
            vec![sample_match("221B Baker St, London NW1 6XE, UK", 51.5237038, -0.1584326)],
        );
        cache.geocoding.insert(
            "Alexanderplatz, Berlin".to_string(),
            vec![sample_match("Alexanderplatz, 10178 Berlin, Germany", 52.521918, 13.413215)],
        );
        cache
    }

    #[test]
    fn test_load_returns_fresh_cache_when_missing() {
        let (manager, _temp_dir) = create_test_cache();

        let cache = manager.load().expect("Load should succeed");

        assert_eq!(cache, Cache::new());
        assert!(!manager.path().exists(), "Loading must not create the file");
    }

    #[test]
    fn test_save_creates_file_in_cache_directory() {
        let (manager, temp_dir) = create_test_cache();

        manager.save(&populated_cache()).expect("Save should succeed");

        let expected_path = temp_dir.path().join(CACHE_FILE);
        assert!(expected_path.exists(), "Cache file should exist");

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"version\": 1"));
        assert!(content.contains("\"requests\""));
        assert!(content.contains("221B Baker Street, London"));
    }

    #[test]
    fn test_cache_survives_serialization_roundtrip() {
        let (manager, _temp_dir) = create_test_cache();
        let original = populated_cache();

        manager.save(&original).expect("Save should succeed");
        let loaded = manager.load().expect("Load should succeed");

        assert_eq!(loaded, original, "Cache should survive roundtrip");
    }

    #[test]
    fn test_save_of_loaded_cache_keeps_bytes_identical() {
        let (manager, _temp_dir) = create_test_cache();
        manager.save(&populated_cache()).expect("Save should succeed");
        let before = fs::read(manager.path()).unwrap();

        let loaded = manager.load().unwrap();
        manager.save(&loaded).unwrap();

        let after = fs::read(manager.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_save_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let manager = CacheManager::with_dir(nested_path.clone());

        manager.save(&Cache::new()).expect("Save should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join(CACHE_FILE).exists(), "Cache file should exist");
    }

    #[test]
    fn test_save_overwrites_existing_snapshot() {
        let (manager, _temp_dir) = create_test_cache();

        manager.save(&populated_cache()).unwrap();
        manager.save(&Cache::new()).unwrap();

        let loaded = manager.load().unwrap();
        assert!(loaded.is_empty(), "Cache should contain latest data only");
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let (manager, temp_dir) = create_test_cache();
        fs::write(temp_dir.path().join(CACHE_FILE), "{ not json").unwrap();

        let err = manager.load().unwrap_err();

        assert!(matches!(err, CacheError::Corrupt { .. }), "got {:?}", err);
        assert!(err.to_string().contains(CACHE_FILE));
    }

    #[test]
    fn test_load_truncated_snapshot_is_corrupt() {
        let (manager, temp_dir) = create_test_cache();
        let path = temp_dir.path().join(CACHE_FILE);
        fs::write(&path, r#"{"version": 1, "requests": {"geocoding": []}}"#).unwrap();

        let err = manager.load().unwrap_err();

        assert!(matches!(err, CacheError::Corrupt { .. }), "got {:?}", err);
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let (manager, temp_dir) = create_test_cache();
        fs::write(
            temp_dir.path().join(CACHE_FILE),
            r#"{"version": 2, "entries": []}"#,
        )
        .unwrap();

        match manager.load() {
            Err(CacheError::UnsupportedVersion { found, expected }) => {
                assert_eq!(found, 2);
                assert_eq!(expected, CACHE_VERSION);
            }
            other => panic!("Expected version error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_unreadable_location_is_io_error() {
        let (manager, temp_dir) = create_test_cache();
        // A directory where the file should be cannot be read as a file
        fs::create_dir(temp_dir.path().join(CACHE_FILE)).unwrap();

        let err = manager.load().unwrap_err();

        assert!(matches!(err, CacheError::Io(_)), "got {:?}", err);
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let (manager, _temp_dir) = create_test_cache();
        manager.save(&populated_cache()).unwrap();

        manager.clear().expect("Clear should succeed");

        assert!(!manager.path().exists());
        assert_eq!(manager.load().unwrap(), Cache::new());
    }

    #[test]
    fn test_clear_without_snapshot_is_noop() {
        let (manager, _temp_dir) = create_test_cache();
        manager.clear().expect("Clearing an empty cache should succeed");
        manager.clear().expect("Clearing twice should succeed");
    }

    #[test]
    fn test_remove_entry_deletes_key_and_persists() {
        let (manager, _temp_dir) = create_test_cache();
        manager.save(&populated_cache()).unwrap();

        let removed = manager
            .remove_entry("221B Baker Street, London", Section::Geocoding)
            .expect("Remove should succeed");

        assert!(removed);
        let loaded = manager.load().unwrap();
        assert!(!loaded.geocoding.contains_key("221B Baker Street, London"));
        assert!(loaded.geocoding.contains_key("Alexanderplatz, Berlin"));
    }

    #[test]
    fn test_remove_missing_entry_still_writes() {
        let temp_dir = TempDir::new().unwrap();
        let observer = Arc::new(RecordingObserver::default());
        let manager =
            CacheManager::with_dir(temp_dir.path().to_path_buf()).with_observer(observer.clone());

        let removed = manager.remove_entry("nowhere", Section::Geocoding).unwrap();

        assert!(!removed);
        assert!(manager.path().exists(), "Snapshot is persisted regardless");
        assert_eq!(
            observer.events(),
            vec![Recorded::Created, Recorded::Written(0)]
        );
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(manager) = CacheManager::new() {
            let path_str = manager.dir().to_string_lossy();
            assert!(
                path_str.contains("geocache"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
