//! Per-user sift directory (`~/.sift`) and the files kept in it.

use crate::manager::ConfigError;
use std::path::{Path, PathBuf};

/// Overrides the home directory location.
pub const HOME_ENV: &str = "SIFT_HOME";
/// Overrides the catalog cache file name.
pub const CATALOG_FILE_ENV: &str = "SIFT_CATALOG_FILE";
/// Overrides the custom rule path registry file name.
pub const CUSTOM_PATH_FILE_ENV: &str = "SIFT_CUSTOM_PATH_FILE";

const DEFAULT_CATALOG_FILE: &str = "Catalog.json";
const DEFAULT_CUSTOM_PATH_FILE: &str = "CustomPaths.json";
const CONFIG_FILE: &str = "config.toml";
const LOG_DIR: &str = "logs";

/// Resolved locations under the sift home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiftHome {
    root: PathBuf,
    catalog_file: String,
    custom_path_file: String,
}

impl SiftHome {
    /// Locate the home directory from the process environment.
    pub fn locate() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Locate the home directory using `lookup` for environment variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let root = match lookup(HOME_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or(ConfigError::HomeNotFound)?
                .join(".sift"),
        };
        Ok(Self::at(root, lookup))
    }

    /// Build a home rooted at `root`, applying file name overrides from `lookup`.
    pub fn at(root: impl Into<PathBuf>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            root: root.into(),
            catalog_file: non_empty(CATALOG_FILE_ENV)
                .unwrap_or_else(|| DEFAULT_CATALOG_FILE.to_string()),
            custom_path_file: non_empty(CUSTOM_PATH_FILE_ENV)
                .unwrap_or_else(|| DEFAULT_CUSTOM_PATH_FILE.to_string()),
        }
    }

    /// Create the home directory if needed.
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.log_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.catalog_file)
    }

    pub fn custom_paths_path(&self) -> PathBuf {
        self.root.join(&self.custom_path_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join(LOG_DIR)
    }
}
