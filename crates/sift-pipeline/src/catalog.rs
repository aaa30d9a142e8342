//! Rule catalog aggregation and its on-disk cache.
//!
//! [`CatalogStore`] is the creation phase: it knows where the cache lives.
//! [`CatalogStore::open`] produces a fully built, immutable [`LocalCatalog`].
//!
//! The cache is reused only when its fingerprint, a SHA-256 over every
//! registered engine's name and version in registration order, matches the
//! current registry. It is rewritten without locking; concurrent
//! invocations race and the last writer wins.

use crate::filter::{matches_all, RuleFilter};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sift_core::{Catalog, EngineRegistry, Error, EventHub, Result, Rule, RuleGroup};
use sift_fs::FileSystem;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SOURCE: &str = "catalog";

#[derive(Debug, Serialize, Deserialize)]
struct CatalogCache {
    fingerprint: String,
    catalog: Catalog,
}

/// Fingerprint of the registry used to decide cache freshness.
pub fn fingerprint(registry: &EngineRegistry) -> String {
    let mut hasher = Sha256::new();
    for engine in registry.all() {
        hasher.update(engine.name().as_bytes());
        hasher.update([0u8]);
        hasher.update(engine.version().as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Location of the catalog cache.
pub struct CatalogStore<F: FileSystem> {
    fs: Arc<F>,
    cache_path: PathBuf,
}

impl<F: FileSystem> CatalogStore<F> {
    pub fn new(fs: Arc<F>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            cache_path: cache_path.into(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Load the catalog from cache when fresh, otherwise rebuild and persist it.
    pub async fn open(&self, registry: &EngineRegistry, events: &EventHub) -> Result<LocalCatalog> {
        let expected = fingerprint(registry);

        match self.read_cache().await {
            Ok(Some(cache)) if cache.fingerprint == expected => {
                tracing::debug!(path = %self.cache_path.display(), "using cached catalog");
                return Ok(LocalCatalog::new(cache.catalog, registry.names(), 0));
            }
            Ok(Some(_)) => {
                events.debug(SOURCE, "Catalog cache is stale; rebuilding");
            }
            Ok(None) => {}
            Err(e) => {
                events.warn(SOURCE, format!("{}; rebuilding", e));
            }
        }

        let catalog = LocalCatalog::build(registry, events).await?;
        self.write_cache(&expected, catalog.catalog(), events).await;
        Ok(catalog)
    }

    async fn read_cache(&self) -> Result<Option<CatalogCache>> {
        let contents = match self.fs.read_to_string(&self.cache_path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| Error::CatalogCorrupt {
                path: self.cache_path.clone(),
                message: e.to_string(),
            })
    }

    // The cache is advisory, so failing to persist it only warns.
    async fn write_cache(&self, fingerprint: &str, catalog: &Catalog, events: &EventHub) {
        let cache = CatalogCache {
            fingerprint: fingerprint.to_string(),
            catalog: catalog.clone(),
        };
        if let Err(e) = self.try_write_cache(&cache).await {
            events.warn(
                SOURCE,
                format!(
                    "Could not write catalog cache {}: {}",
                    self.cache_path.display(),
                    e
                ),
            );
        }
    }

    async fn try_write_cache(&self, cache: &CatalogCache) -> Result<()> {
        let json = serde_json::to_string_pretty(cache)?;
        if let Some(parent) = self.cache_path.parent() {
            self.fs.create_dir_all(parent).await?;
        }
        let temp_path = self.cache_path.with_extension("json.tmp");
        self.fs.write(&temp_path, &json).await?;
        self.fs.rename(&temp_path, &self.cache_path).await?;
        Ok(())
    }
}

/// An immutable, fully built catalog.
#[derive(Debug, Clone)]
pub struct LocalCatalog {
    catalog: Catalog,
    engine_order: Vec<String>,
    rejected: usize,
}

impl LocalCatalog {
    pub fn new(catalog: Catalog, engine_order: Vec<String>, rejected: usize) -> Self {
        Self {
            catalog,
            engine_order,
            rejected,
        }
    }

    /// Aggregate every engine's catalog, validating each rule descriptor.
    ///
    /// Malformed descriptors are excluded, counted and reported as error
    /// events; they do not fail the build.
    pub async fn build(registry: &EngineRegistry, events: &EventHub) -> Result<Self> {
        let engine_catalogs = try_join_all(registry.all().iter().map(|engine| async move {
            engine
                .catalog()
                .await
                .map(|catalog| (engine.name().to_string(), catalog))
                .map_err(|e| Error::EngineFailed {
                    engine: engine.name().to_string(),
                    message: format!("could not load catalog: {}", e),
                })
        }))
        .await?;

        let mut catalog = Catalog::default();
        let mut rejected = 0;

        for (engine, engine_catalog) in engine_catalogs {
            let mut seen: HashSet<String> = HashSet::new();
            for descriptor in engine_catalog.rules {
                match Rule::from_descriptor(&engine, descriptor) {
                    Ok(rule) if seen.insert(rule.name.clone()) => catalog.rules.push(rule),
                    Ok(rule) => {
                        rejected += 1;
                        events.error(
                            SOURCE,
                            format!(
                                "Engine {} reported rule '{}' twice; keeping the first",
                                engine, rule.name
                            ),
                        );
                    }
                    Err(reason) => {
                        rejected += 1;
                        events.error(
                            SOURCE,
                            format!("Engine {} reported a malformed rule: {}", engine, reason),
                        );
                    }
                }
            }

            let own = |mut group: RuleGroup| {
                group.engine = engine.clone();
                group
            };
            catalog
                .categories
                .extend(engine_catalog.categories.into_iter().map(own));
            catalog
                .rulesets
                .extend(engine_catalog.rulesets.into_iter().map(own));
        }

        if rejected > 0 {
            events.error(SOURCE, format!("{} rule(s) were excluded from the catalog", rejected));
        }
        events.debug(
            SOURCE,
            format!("Catalog built with {} rules", catalog.rules.len()),
        );

        Ok(Self::new(catalog, registry.names(), rejected))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Engine names in registration order.
    pub fn engine_order(&self) -> &[String] {
        &self.engine_order
    }

    /// Descriptors excluded while building.
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }

    /// Rules satisfying every filter; with no filters, the default-enabled rules.
    pub fn rules_matching(&self, filters: &[RuleFilter]) -> Vec<&Rule> {
        self.catalog
            .rules
            .iter()
            .filter(|rule| {
                if filters.is_empty() {
                    rule.default_enabled
                } else {
                    matches_all(filters, rule)
                }
            })
            .collect()
    }

    /// Rule groups named by category/ruleset filters.
    ///
    /// With no category or ruleset filter every category is included, and an
    /// info event records each one so the default is auditable. An engine
    /// filter, if present, restricts the groups to those engines.
    pub fn rule_groups_matching(
        &self,
        filters: &[RuleFilter],
        events: &EventHub,
    ) -> Vec<&RuleGroup> {
        let engines: Option<&Vec<String>> = filters.iter().find_map(|f| match f {
            RuleFilter::Engine(values) => Some(values),
            _ => None,
        });
        let engine_ok = |group: &RuleGroup| {
            engines.map_or(true, |names| {
                names.iter().any(|n| n.eq_ignore_ascii_case(&group.engine))
            })
        };

        let group_filters: Vec<&RuleFilter> =
            filters.iter().filter(|f| f.is_group_filter()).collect();

        if group_filters.is_empty() {
            let groups: Vec<&RuleGroup> = self
                .catalog
                .categories
                .iter()
                .filter(|g| engine_ok(*g))
                .collect();
            for group in &groups {
                events.info(
                    SOURCE,
                    format!(
                        "Implicitly including category '{}' for engine {}",
                        group.name, group.engine
                    ),
                );
            }
            return groups;
        }

        let named = |values: &[String], group: &RuleGroup| {
            values.iter().any(|v| v.eq_ignore_ascii_case(&group.name))
        };

        let mut groups: Vec<&RuleGroup> = Vec::new();
        for filter in group_filters {
            let (values, pool) = match filter {
                RuleFilter::Category(values) => (values, &self.catalog.categories),
                RuleFilter::Ruleset(values) => (values, &self.catalog.rulesets),
                _ => continue,
            };
            for group in pool {
                if named(values.as_slice(), group) && engine_ok(group) && !groups.contains(&group) {
                    groups.push(group);
                }
            }
        }
        groups
    }
}
