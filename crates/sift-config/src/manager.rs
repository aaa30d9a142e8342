use crate::types::SiftConfig;
use sift_fs::{FileSystem, NativeFileSystem};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Failures while reading or writing sift's own files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error in {path}: {source}")]
    TomlDe {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Owns the loaded `config.toml` (from `~/.sift` or `--config`) and the
/// path it is saved back to.
pub struct ConfigManager<F: FileSystem = NativeFileSystem> {
    fs: Arc<F>,
    config_path: PathBuf,
    config: SiftConfig,
}

fn scoped_fs(path: &Path) -> Result<Arc<NativeFileSystem>, ConfigError> {
    // Relative paths resolve against the root, so only absolute ones may rebase it.
    let config_dir = match path.parent() {
        Some(parent) if path.is_absolute() && !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(Arc::new(NativeFileSystem::new(config_dir)?))
}

impl ConfigManager {
    /// Read the config at `path`.
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let fs = scoped_fs(path)?;
        Self::load_with_filesystem(fs, path).await
    }

    /// Write the defaults to `path` and keep them loaded.
    pub async fn init_at(path: &Path) -> Result<Self, ConfigError> {
        let fs = scoped_fs(path)?;
        let manager = Self {
            fs,
            config_path: path.to_path_buf(),
            config: SiftConfig::default(),
        };
        manager.save().await?;
        Ok(manager)
    }

    /// Load the config at `path`, writing defaults first if it is missing
    pub async fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_from(path).await {
            Err(ConfigError::ConfigNotFound(_)) => {
                tracing::info!(path = %path.display(), "creating default configuration");
                Self::init_at(path).await
            }
            other => other,
        }
    }
}

impl<F: FileSystem> ConfigManager<F> {
    /// Read the config through `fs`; used by tests and non-native filesystems.
    pub async fn load_with_filesystem(fs: Arc<F>, path: &Path) -> Result<Self, ConfigError> {
        if !fs.exists(path).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs.read_to_string(path).await?;
        let config: SiftConfig = toml::from_str(&contents).map_err(|source| ConfigError::TomlDe {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            fs,
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Write `config.toml.tmp`, then rename it over the config file.
    pub async fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(&self.config)?;

        let temp_path = self.config_path.with_extension("toml.tmp");
        self.fs.write(&temp_path, &toml_str).await?;
        self.fs.rename(&temp_path, &self.config_path).await?;

        Ok(())
    }

    pub fn config(&self) -> &SiftConfig {
        &self.config
    }

    /// Changes are in memory until [`ConfigManager::save`].
    pub fn config_mut(&mut self) -> &mut SiftConfig {
        &mut self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Consume the manager, keeping only the loaded config
    pub fn into_config(self) -> SiftConfig {
        self.config
    }
}
