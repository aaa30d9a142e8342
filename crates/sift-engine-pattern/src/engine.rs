//! The pattern engine: a [`sift_core::RuleEngine`] over compiled regex rules.

use crate::constants::MAX_CONTENT_SIZE;
use crate::loader::{sources_digest, RuleLoader, RuleSource};
use crate::matcher::CompiledRule;
use async_trait::async_trait;
use sift_core::{
    EngineCatalog, Error, EventHub, Result, Rule, RuleDescriptor, RuleEngine, RuleGroup,
    RunContext, Violation,
};
use sift_fs::{DiscoveryOptions, FileSystem};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Rules compiled during `init`.
#[derive(Debug)]
struct LoadedRules {
    rules: Vec<CompiledRule>,
    version: String,
}

impl LoadedRules {
    fn find(&self, name: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.name() == name)
    }
}

/// Regex rule engine configured by name, built-in pack, custom rule files
/// and target patterns.
pub struct PatternEngine<F: FileSystem> {
    name: String,
    builtin: Option<String>,
    custom_paths: Vec<PathBuf>,
    target_patterns: Vec<String>,
    fs: Arc<F>,
    loaded: OnceCell<LoadedRules>,
}

impl<F: FileSystem> PatternEngine<F> {
    pub fn new(name: impl Into<String>, fs: Arc<F>) -> Self {
        Self {
            name: name.into(),
            builtin: None,
            custom_paths: Vec::new(),
            target_patterns: Vec::new(),
            fs,
            loaded: OnceCell::new(),
        }
    }

    pub fn with_builtin(mut self, pack: impl Into<String>) -> Self {
        self.builtin = Some(pack.into());
        self
    }

    pub fn with_custom_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.custom_paths = paths;
        self
    }

    pub fn with_target_patterns(mut self, patterns: Vec<String>) -> Self {
        self.target_patterns = patterns;
        self
    }

    async fn loaded(&self, events: &EventHub) -> Result<&LoadedRules> {
        self.loaded.get_or_try_init(|| self.load(events)).await
    }

    // Unreadable files, bad TOML and bad regexes are reported and skipped.
    // Only an unknown built-in pack is fatal, since it is a configuration error.
    async fn load(&self, events: &EventHub) -> Result<LoadedRules> {
        let loader = RuleLoader::new(self.fs.clone());
        let mut sources: Vec<RuleSource> = Vec::new();

        if let Some(pack) = &self.builtin {
            sources.push(loader.built_in(pack)?);
        }
        for path in &self.custom_paths {
            match loader.read_file(path).await {
                Ok(source) => sources.push(source),
                Err(e) => events.error(&self.name, format!("Skipping custom rules: {}", e)),
            }
        }

        let mut rules: Vec<CompiledRule> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for source in &sources {
            let parsed = match source.parse() {
                Ok(parsed) => parsed,
                Err(e) => {
                    events.error(&self.name, e.to_string());
                    continue;
                }
            };
            for rule in parsed {
                if !seen.insert(rule.name.clone()) {
                    events.warn(
                        &self.name,
                        format!(
                            "Rule '{}' in {} is already defined; keeping the first definition",
                            rule.name, source.label
                        ),
                    );
                    continue;
                }
                match CompiledRule::compile(rule) {
                    Ok(compiled) => rules.push(compiled),
                    Err(e) => events.error(&self.name, e.to_string()),
                }
            }
        }

        let version = format!(
            "{}+{}",
            env!("CARGO_PKG_VERSION"),
            sources_digest(&sources)
        );
        debug!(engine = %self.name, rules = rules.len(), %version, "pattern rules loaded");

        Ok(LoadedRules { rules, version })
    }

    // Directories (degraded targets) are walked; everything else is a file.
    async fn expand_path(&self, path: &str) -> Result<Vec<String>> {
        let metadata = self.fs.metadata(Path::new(path)).await?;
        if !metadata.is_dir {
            return Ok(vec![path.to_string()]);
        }
        let base = path.trim_end_matches('/');
        Ok(self
            .fs
            .discover(Path::new(path), &DiscoveryOptions::default())
            .await?
            .into_iter()
            .map(|p| format!("{}/{}", base, p))
            .collect())
    }

    async fn scan_file(
        &self,
        file: &str,
        rules: &[(&Rule, &CompiledRule)],
        events: &EventHub,
        out: &mut Vec<Violation>,
    ) {
        let path = Path::new(file);
        let metadata = match self.fs.metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                events.warn(&self.name, format!("Skipping {}: {}", file, e));
                return;
            }
        };
        if metadata.size > MAX_CONTENT_SIZE {
            events.warn(
                &self.name,
                format!("Skipping {}: larger than {} bytes", file, MAX_CONTENT_SIZE),
            );
            return;
        }
        let content = match self.fs.read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                events.warn(&self.name, format!("Skipping {}: {}", file, e));
                return;
            }
        };

        let mut found: Vec<Violation> = Vec::new();
        for (rule, compiled) in rules {
            for m in compiled.find_matches(&content) {
                found.push(Violation {
                    rule: rule.name.clone(),
                    engine: self.name.clone(),
                    severity: rule.severity,
                    file: file.to_string(),
                    line: Some(m.line),
                    column: Some(m.column),
                    end_line: Some(m.end_line),
                    end_column: Some(m.end_column),
                    message: compiled.rule.violation_message().to_string(),
                    category: rule.categories.first().cloned(),
                    url: rule.resource_urls.first().cloned(),
                });
            }
        }
        // Source order within a file; the sort is stable so rule order breaks ties.
        found.sort_by_key(|v| (v.line, v.column));
        out.extend(found);
    }
}

impl<F: FileSystem> fmt::Debug for PatternEngine<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternEngine")
            .field("name", &self.name)
            .field("builtin", &self.builtin)
            .field("custom_paths", &self.custom_paths)
            .field("target_patterns", &self.target_patterns)
            .field("initialized", &self.loaded.initialized())
            .finish()
    }
}

#[async_trait]
impl<F: FileSystem + 'static> RuleEngine for PatternEngine<F> {
    fn name(&self) -> &str {
        &self.name
    }

    /// Crate version plus a digest of the rule sources, once loaded.
    fn version(&self) -> String {
        match self.loaded.get() {
            Some(loaded) => loaded.version.clone(),
            None => env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    async fn init(&self, events: &EventHub) -> Result<()> {
        self.loaded(events).await.map(|_| ())
    }

    async fn catalog(&self) -> Result<EngineCatalog> {
        let loaded = self.loaded(&EventHub::new()).await?;

        let rules: Vec<RuleDescriptor> =
            loaded.rules.iter().map(|r| r.rule.to_descriptor()).collect();
        let mut categories: Vec<RuleGroup> = Vec::new();
        let mut rulesets: Vec<RuleGroup> = Vec::new();
        for compiled in &loaded.rules {
            let rule = &compiled.rule;
            for category in &rule.categories {
                add_to_group(&mut categories, category, &self.name, &rule.name);
            }
            for ruleset in &rule.rulesets {
                add_to_group(&mut rulesets, ruleset, &self.name, &rule.name);
            }
        }

        Ok(EngineCatalog {
            rules,
            categories,
            rulesets,
        })
    }

    async fn target_patterns(&self, _target: &str) -> Result<Vec<String>> {
        Ok(self.target_patterns.clone())
    }

    async fn run(&self, ctx: RunContext<'_>) -> Result<Vec<Violation>> {
        let loaded = self.loaded(ctx.events).await?;

        let mut selected: Vec<(&Rule, &CompiledRule)> = Vec::with_capacity(ctx.rules.len());
        for rule in ctx.rules {
            let compiled = loaded.find(&rule.name).ok_or_else(|| Error::EngineFailed {
                engine: self.name.clone(),
                message: format!("unknown rule '{}'", rule.name),
            })?;
            selected.push((rule, compiled));
        }

        debug!(
            engine = %self.name,
            rules = selected.len(),
            groups = ctx.groups.len(),
            targets = ctx.targets.len(),
            "running pattern rules"
        );

        let mut violations = Vec::new();
        for target in ctx.targets {
            for path in target.resolved_paths() {
                let files = match self.expand_path(&path).await {
                    Ok(files) => files,
                    Err(e) => {
                        ctx.events.warn(&self.name, format!("Skipping {}: {}", path, e));
                        continue;
                    }
                };
                for file in files {
                    self.scan_file(&file, &selected, ctx.events, &mut violations)
                        .await;
                }
            }
        }

        Ok(violations)
    }
}

fn add_to_group(groups: &mut Vec<RuleGroup>, name: &str, engine: &str, rule: &str) {
    match groups.iter_mut().find(|g| g.name == name) {
        Some(group) => group.paths.push(rule.to_string()),
        None => groups.push(RuleGroup {
            name: name.to_string(),
            engine: engine.to_string(),
            paths: vec![rule.to_string()],
        }),
    }
}
