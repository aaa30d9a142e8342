//! Target resolution.
//!
//! Expands user-supplied targets (files, directories, globs) into the concrete
//! files each engine will analyze, applying that engine's include/exclude
//! patterns.
//!
//! Absence is not an error during bulk resolution: a missing path, or a
//! directory with no matching files, simply produces no [`RuleTarget`]. An
//! invocation commonly names paths that only some engines care about.
//! Explicitly named paths are checked separately by
//! [`TargetResolver::validate_explicit`] before anything runs.
//!
//! # Degraded mode
//!
//! An engine that declares no patterns cannot be filtered for. Its
//! directories are passed through as a single `"."` entry, files are passed
//! as-is and glob expansions are kept whole. This is a coarse fallback: the
//! engine receives paths it may not understand.

use sift_core::{EngineRegistry, Error, EventHub, Result, RuleEngine, RuleSelection, RuleTarget};
use sift_fs::{has_magic, DiscoveryOptions, FileSystem, TargetPatterns};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolved targets keyed by engine name.
pub type EngineTargets = BTreeMap<String, Vec<RuleTarget>>;

pub struct TargetResolver<F: FileSystem> {
    fs: Arc<F>,
    discovery: DiscoveryOptions,
}

impl<F: FileSystem> TargetResolver<F> {
    pub fn new(fs: Arc<F>) -> Self {
        Self {
            fs,
            discovery: DiscoveryOptions::default(),
        }
    }

    /// Fail with `TargetNotFound` for the first literal target that does not exist.
    ///
    /// Globs are not checked; an empty expansion is legal.
    pub async fn validate_explicit<S: AsRef<str>>(&self, targets: &[S]) -> Result<()> {
        for target in targets {
            let target = target.as_ref();
            if has_magic(target) {
                continue;
            }
            if !self.fs.exists(Path::new(target)).await? {
                return Err(Error::TargetNotFound {
                    path: PathBuf::from(target),
                });
            }
        }
        Ok(())
    }

    /// Resolve one target for one engine.
    ///
    /// Returns `None` when nothing applicable remains.
    pub async fn resolve(
        &self,
        engine: &dyn RuleEngine,
        target: &str,
        events: &EventHub,
    ) -> Result<Option<RuleTarget>> {
        let raw_patterns = engine.target_patterns(target).await?;
        let patterns = TargetPatterns::new(&raw_patterns)
            .map_err(|e| Error::Pattern(format!("engine {}: {}", engine.name(), e)))?;

        if patterns.is_empty() {
            events.debug(
                engine.name(),
                format!("No target patterns declared; passing '{}' through unfiltered", target),
            );
        }

        if has_magic(target) {
            let paths: Vec<String> = self
                .fs
                .expand_glob(target)
                .await?
                .into_iter()
                .filter(|p| patterns.is_empty() || patterns.matches(p))
                .collect();
            return Ok(non_empty(target, false, paths));
        }

        let meta = self.fs.metadata(Path::new(target)).await?;
        if !meta.exists {
            return Ok(None);
        }

        if meta.is_dir {
            if patterns.is_empty() {
                return Ok(non_empty(target, true, vec![".".to_string()]));
            }
            let paths: Vec<String> = self
                .fs
                .discover(Path::new(target), &self.discovery)
                .await?
                .into_iter()
                .filter(|p| patterns.matches(p))
                .collect();
            return Ok(non_empty(target, true, paths));
        }

        if patterns.is_empty() || patterns.matches(target) {
            return Ok(non_empty(target, false, vec![target.to_string()]));
        }
        if let Some(pattern) = patterns.excluded_by(target) {
            events.debug(
                engine.name(),
                format!("Skipping '{}': excluded by '{}'", target, pattern),
            );
        }
        Ok(None)
    }

    /// Resolve every target for one engine, preserving target order.
    pub async fn resolve_all<S: AsRef<str>>(
        &self,
        engine: &dyn RuleEngine,
        targets: &[S],
        events: &EventHub,
    ) -> Result<Vec<RuleTarget>> {
        let mut resolved = Vec::new();
        for target in targets {
            if let Some(rule_target) = self.resolve(engine, target.as_ref(), events).await? {
                resolved.push(rule_target);
            }
        }
        Ok(resolved)
    }

    /// Resolve targets for every engine that has selected rules.
    pub async fn resolve_for_selection<S: AsRef<str>>(
        &self,
        registry: &EngineRegistry,
        selection: &RuleSelection,
        targets: &[S],
        events: &EventHub,
    ) -> Result<EngineTargets> {
        let mut by_engine = EngineTargets::new();
        for name in selection.engines() {
            let engine = registry
                .find_by_name(name)
                .ok_or_else(|| Error::EngineNotFound {
                    name: name.to_string(),
                })?;
            let resolved = self.resolve_all(engine, targets, events).await?;
            events.debug(
                name,
                format!(
                    "{} target(s) with {} file(s)",
                    resolved.len(),
                    resolved.iter().map(|t| t.paths.len()).sum::<usize>()
                ),
            );
            by_engine.insert(name.to_string(), resolved);
        }
        Ok(by_engine)
    }
}

fn non_empty(target: &str, is_directory: bool, paths: Vec<String>) -> Option<RuleTarget> {
    if paths.is_empty() {
        None
    } else {
        Some(RuleTarget {
            target: target.to_string(),
            is_directory,
            paths,
        })
    }
}
