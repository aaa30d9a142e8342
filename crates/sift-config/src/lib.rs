pub mod custom_paths;
pub mod home;
pub mod manager;
pub mod types;

pub use custom_paths::CustomRulePaths;
pub use home::{SiftHome, CATALOG_FILE_ENV, CUSTOM_PATH_FILE_ENV, HOME_ENV};
pub use manager::{ConfigError, ConfigManager};
pub use types::{EngineSettings, SiftConfig, PATTERN_ENGINE_KIND};
