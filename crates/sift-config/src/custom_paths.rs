//! Registry of user-supplied custom rule files.
//!
//! Persisted as JSON mapping engine → language → set of paths. The file is
//! an advisory cache: a missing or empty file is treated as an empty registry.

use crate::manager::ConfigError;
use sift_fs::FileSystem;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

type Registry = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// Opened custom rule path registry.
pub struct CustomRulePaths<F: FileSystem> {
    fs: Arc<F>,
    path: PathBuf,
    entries: Registry,
}

impl<F: FileSystem> CustomRulePaths<F> {
    /// Read the registry at `path`.
    pub async fn open(fs: Arc<F>, path: &Path) -> Result<Self, ConfigError> {
        let entries = match fs.read_to_string(path).await {
            Ok(contents) if contents.trim().is_empty() => Registry::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Registry::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            fs,
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Register rule files for `engine`/`language`.
    ///
    /// Directories contribute their immediate files. Relative paths are
    /// resolved against the filesystem root. Returns the paths added.
    pub async fn add(
        &mut self,
        engine: &str,
        language: &str,
        paths: &[PathBuf],
    ) -> Result<Vec<String>, ConfigError> {
        let mut expanded = Vec::new();
        for path in paths {
            let absolute = if path.is_absolute() {
                path.clone()
            } else {
                self.fs.root().join(path)
            };
            let meta = self.fs.metadata(&absolute).await?;
            if !meta.exists {
                return Err(ConfigError::PathNotFound(path.clone()));
            }
            if meta.is_dir {
                expanded.extend(self.fs.list_files(&absolute).await?);
            } else {
                expanded.push(absolute);
            }
        }

        let bucket = self
            .entries
            .entry(engine.to_string())
            .or_default()
            .entry(language.to_string())
            .or_default();

        let mut added = Vec::new();
        for path in expanded {
            let shown = path.to_string_lossy().into_owned();
            if bucket.insert(shown.clone()) {
                added.push(shown);
            }
        }
        Ok(added)
    }

    /// Write the registry as pretty JSON.
    pub async fn save(&self) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            ConfigError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent).await?;
        }
        self.fs.write(&self.path, &json).await?;
        Ok(())
    }

    /// Every path registered for `engine`, across languages, sorted.
    pub fn paths_for_engine(&self, engine: &str) -> Vec<PathBuf> {
        let mut paths: BTreeSet<&String> = BTreeSet::new();
        if let Some(languages) = self.entries.get(engine) {
            for set in languages.values() {
                paths.extend(set.iter());
            }
        }
        paths.into_iter().map(PathBuf::from).collect()
    }

    /// Engine → language → paths, in sorted order.
    pub fn entries(&self) -> &BTreeMap<String, BTreeMap<String, BTreeSet<String>>> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
