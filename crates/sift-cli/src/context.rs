//! Shared state handed to every command.

use crate::console::Console;
use crate::engines;
use crate::listeners::{EventDisplayer, EventLogger};
use anyhow::{Context, Result};
use sift_config::{ConfigManager, CustomRulePaths, SiftConfig, SiftHome};
use sift_core::{EngineRegistry, EventHub, ListenerId};
use sift_fs::{FileSystem, NativeFileSystem};
use sift_pipeline::{CatalogStore, LocalCatalog};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Home directory, loaded config, workspace filesystem, event hub and console.
pub struct AppContext {
    home: SiftHome,
    config: SiftConfig,
    fs: Arc<NativeFileSystem>,
    events: EventHub,
    console: Arc<dyn Console>,
}

impl AppContext {
    pub fn new(
        home: SiftHome,
        config: SiftConfig,
        fs: Arc<NativeFileSystem>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            home,
            config,
            fs,
            events: EventHub::new(),
            console,
        }
    }

    /// Locate the home directory, load (or create) the config, and root the
    /// filesystem at the current directory.
    pub async fn from_env(
        config_override: Option<&Path>,
        console: Arc<dyn Console>,
    ) -> Result<Self> {
        let home = SiftHome::locate().context("Failed to locate the sift home directory")?;
        home.ensure()
            .with_context(|| format!("Failed to create {}", home.root().display()))?;

        let config_path = config_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| home.config_path());
        let config = ConfigManager::load_or_init(&config_path)
            .await
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
            .into_config();

        let fs = Arc::new(
            NativeFileSystem::current_dir().context("Failed to open the working directory")?,
        );
        debug!("Workspace root: {}", fs.root().display());

        Ok(Self::new(home, config, fs, console))
    }

    pub fn home(&self) -> &SiftHome {
        &self.home
    }

    pub fn config(&self) -> &SiftConfig {
        &self.config
    }

    pub fn fs(&self) -> &Arc<NativeFileSystem> {
        &self.fs
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    pub async fn custom_paths(&self) -> Result<CustomRulePaths<NativeFileSystem>> {
        let path = self.home.custom_paths_path();
        CustomRulePaths::open(self.fs.clone(), &path)
            .await
            .with_context(|| format!("Failed to read custom rule paths from {}", path.display()))
    }

    /// Construct and initialize every enabled engine.
    pub async fn build_registry(&self) -> Result<EngineRegistry> {
        let custom = self.custom_paths().await?;
        let registry = engines::build_registry(&self.config, self.fs.clone(), &custom)?;
        registry
            .init_all(&self.events)
            .await
            .context("Failed to initialize engines")?;
        Ok(registry)
    }

    /// Open the rule catalog, reusing the cache when it is current.
    pub async fn open_catalog(&self, registry: &EngineRegistry) -> Result<LocalCatalog> {
        let store = CatalogStore::new(self.fs.clone(), self.home.catalog_path());
        let catalog = store
            .open(registry, &self.events)
            .await
            .context("Failed to build the rule catalog")?;
        Ok(catalog)
    }

    /// Attach the console displayer and the log file writer.
    pub fn attach_listeners(&self) -> Result<Vec<ListenerId>> {
        let log_dir = self.home.log_dir();
        let logger = EventLogger::create(&log_dir)
            .with_context(|| format!("Failed to create a log file in {}", log_dir.display()))?;
        debug!("Writing events to {}", logger.path().display());

        Ok(vec![
            self.events
                .attach(Arc::new(EventDisplayer::new(self.console.clone()))),
            self.events.attach(Arc::new(logger)),
        ])
    }

    pub fn detach_listeners(&self, ids: Vec<ListenerId>) {
        for id in ids {
            self.events.detach(id);
        }
    }
}
