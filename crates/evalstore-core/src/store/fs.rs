//! Filesystem backing for the run store.
//!
//! Each project keeps its files under one data directory; `runs.json` is
//! replaced wholesale on every save via a temp file in the same directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::error::{Result, StoreError};
use crate::domain::run::RunStore;
use crate::obs;

/// Default data directory, relative to the project root.
pub const DEFAULT_DATA_DIR: &str = ".evalstore";
/// Current-format store file.
pub const RUNS_FILE_NAME: &str = "runs.json";
/// Pre-2.0 baseline file.
pub const LEGACY_FILE_NAME: &str = "baselines.json";
/// Appended to the legacy file name for the one-time migration backup.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Where a project's store files live.
///
/// Layout: `<project>/<data_dir>/{runs.json, baselines.json, baselines.json.backup}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub data_dir: PathBuf,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl StoreLayout {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.data_dir)
    }

    pub fn store_path(&self, project_root: &Path) -> PathBuf {
        self.data_dir(project_root).join(RUNS_FILE_NAME)
    }

    pub fn legacy_path(&self, project_root: &Path) -> PathBuf {
        self.data_dir(project_root).join(LEGACY_FILE_NAME)
    }

    pub fn backup_path(&self, project_root: &Path) -> PathBuf {
        self.data_dir(project_root)
            .join(format!("{}{}", LEGACY_FILE_NAME, BACKUP_SUFFIX))
    }
}

/// Path of `runs.json` for `project_root` under the default layout.
pub fn resolve_store_path(project_root: &Path) -> PathBuf {
    StoreLayout::default().store_path(project_root)
}

/// Filesystem-backed run store, one JSON file per project.
#[derive(Debug, Clone, Default)]
pub struct FsRunStore {
    layout: StoreLayout,
}

impl FsRunStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn store_path(&self, project_root: &Path) -> PathBuf {
        self.layout.store_path(project_root)
    }

    pub fn exists(&self, project_root: &Path) -> bool {
        self.store_path(project_root).exists()
    }

    /// Load the store for `project_root`.
    ///
    /// A missing file yields a fresh in-memory store that is *not* written.
    /// A file that fails to parse is [`StoreError::Corrupt`].
    pub fn load(&self, project_root: &Path) -> Result<RunStore> {
        let path = self.store_path(project_root);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                obs::emit_store_initialized(&path);
                return Ok(RunStore::new(project_root.to_string_lossy()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let store: RunStore = serde_json::from_str(&content).map_err(|source| {
            obs::emit_store_corrupt(&path, &source);
            StoreError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        obs::emit_store_loaded(&path, store.count());
        Ok(store)
    }

    /// Write the whole store, replacing the previous file.
    pub fn save(&self, project_root: &Path, store: &RunStore) -> Result<()> {
        let path = self.store_path(project_root);
        let content = serde_json::to_string_pretty(store)?;
        write_atomic(&path, content.as_bytes())?;
        obs::emit_store_saved(&path, store.count());
        Ok(())
    }
}

/// Write to a temp file in the target's directory, then rename over it.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.write_all(b"\n")?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, FsRunStore) {
        let dir = tempfile::tempdir().unwrap();
        (dir, FsRunStore::default())
    }

    #[test]
    fn resolve_store_path_is_deterministic() {
        let root = Path::new("/work/project");
        assert_eq!(resolve_store_path(root), resolve_store_path(root));
        assert_eq!(
            resolve_store_path(root),
            PathBuf::from("/work/project/.evalstore/runs.json")
        );
    }

    #[test]
    fn layout_paths_are_siblings() {
        let layout = StoreLayout::new("bench-data");
        let root = Path::new("/p");
        assert_eq!(layout.store_path(root), PathBuf::from("/p/bench-data/runs.json"));
        assert_eq!(layout.legacy_path(root), PathBuf::from("/p/bench-data/baselines.json"));
        assert_eq!(
            layout.backup_path(root),
            PathBuf::from("/p/bench-data/baselines.json.backup")
        );
    }

    #[test]
    fn load_missing_returns_fresh_store_without_writing() {
        let (dir, fs_store) = make_store();
        let store = fs_store.load(dir.path()).unwrap();
        assert_eq!(store.version, "2.0");
        assert_eq!(store.repo_path, dir.path().to_string_lossy());
        assert_eq!(store.count(), 0);
        assert!(!fs_store.exists(dir.path()));
    }

    #[test]
    fn load_corrupt_is_fatal() {
        let (dir, fs_store) = make_store();
        let path = fs_store.store_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{\"version\": \"2.0\", \"runs\": ").unwrap();

        match fs_store.load(dir.path()) {
            Err(StoreError::Corrupt { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn save_writes_pretty_json_and_leaves_no_temp_files() {
        let (dir, fs_store) = make_store();
        let store = RunStore::new("/repo");
        fs_store.save(dir.path(), &store).unwrap();

        let content = fs::read_to_string(fs_store.store_path(dir.path())).unwrap();
        assert!(content.starts_with("{\n  \"version\": \"2.0\""));

        let entries: Vec<_> = fs::read_dir(fs_store.layout().data_dir(dir.path()))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
