//! Engine factory table.
//!
//! Each configured engine names a `kind`; the kind picks a constructor
//! from [`ENGINE_FACTORIES`]. Disabled engines are never constructed.

use sift_config::{CustomRulePaths, EngineSettings, SiftConfig, PATTERN_ENGINE_KIND};
use sift_core::{EngineRegistry, Error, Result, RuleEngine};
use sift_engine_pattern::PatternEngine;
use sift_fs::NativeFileSystem;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

type EngineConstructor =
    fn(&EngineSettings, Arc<NativeFileSystem>, Vec<PathBuf>) -> Box<dyn RuleEngine>;

/// Known engine kinds and how to build them.
pub const ENGINE_FACTORIES: &[(&str, EngineConstructor)] = &[(PATTERN_ENGINE_KIND, pattern_engine)];

fn pattern_engine(
    settings: &EngineSettings,
    fs: Arc<NativeFileSystem>,
    custom_paths: Vec<PathBuf>,
) -> Box<dyn RuleEngine> {
    let mut engine = PatternEngine::new(settings.name.clone(), fs)
        .with_custom_paths(custom_paths)
        .with_target_patterns(settings.target_patterns.clone());
    if let Some(pack) = &settings.builtin {
        engine = engine.with_builtin(pack.clone());
    }
    Box::new(engine)
}

/// Construct every enabled engine in configuration order.
///
/// Engines are not initialized here; call [`EngineRegistry::init_all`].
pub fn build_registry(
    config: &SiftConfig,
    fs: Arc<NativeFileSystem>,
    custom: &CustomRulePaths<NativeFileSystem>,
) -> Result<EngineRegistry> {
    let mut registry = EngineRegistry::new();

    for settings in config.enabled_engines() {
        let constructor = ENGINE_FACTORIES
            .iter()
            .find(|(kind, _)| kind.eq_ignore_ascii_case(&settings.kind))
            .map(|(_, constructor)| *constructor)
            .ok_or_else(|| Error::UnknownEngineKind {
                engine: settings.name.clone(),
                kind: settings.kind.clone(),
            })?;

        let custom_paths = custom.paths_for_engine(&settings.name);
        debug!(
            "Constructing {} engine '{}' with {} custom rule file(s)",
            settings.kind,
            settings.name,
            custom_paths.len()
        );
        registry.register(constructor(settings, fs.clone(), custom_paths))?;
    }

    Ok(registry)
}
