//! Rule engine capability trait and registry.

use crate::error::{Error, Result};
use crate::events::EventHub;
use crate::types::{Rule, RuleDescriptor, RuleGroup, RuleTarget, Violation};
use async_trait::async_trait;
use std::fmt;

/// Everything an engine reports about its rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineCatalog {
    pub rules: Vec<RuleDescriptor>,
    pub categories: Vec<RuleGroup>,
    pub rulesets: Vec<RuleGroup>,
}

/// Inputs for one engine invocation.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub groups: &'a [RuleGroup],
    pub rules: &'a [Rule],
    pub targets: &'a [RuleTarget],
    pub events: &'a EventHub,
}

/// Trait for pluggable rule engines.
///
/// Engines own a rule set and know how to evaluate it against files. The
/// pipeline only ever sees this contract.
///
/// # Thread Safety
///
/// Implementations must be Send + Sync so engines can run concurrently.
///
/// # Errors
///
/// `run` rejects only when the engine as a whole cannot produce a trustworthy
/// result. Problems with individual files should be reported through
/// `RunContext::events` as warnings instead.
#[async_trait]
pub trait RuleEngine: Send + Sync + fmt::Debug {
    /// Returns the engine name (e.g., "apex", "javascript").
    fn name(&self) -> &str;

    /// Version string used for catalog invalidation.
    fn version(&self) -> String {
        "0".to_string()
    }

    /// Idempotent setup. Called once the engine is registered, before any
    /// other async method.
    async fn init(&self, _events: &EventHub) -> Result<()> {
        Ok(())
    }

    /// Raw rule metadata for catalog aggregation.
    async fn catalog(&self) -> Result<EngineCatalog>;

    /// Glob patterns for `target`; a leading `!` marks an exclusion.
    async fn target_patterns(&self, target: &str) -> Result<Vec<String>>;

    /// Evaluate `ctx.rules` against `ctx.targets`.
    async fn run(&self, ctx: RunContext<'_>) -> Result<Vec<Violation>>;
}

/// Engines in registration order.
#[derive(Default)]
pub struct EngineRegistry {
    engines: Vec<Box<dyn RuleEngine>>,
}

impl EngineRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an engine. Registration order drives output ordering.
    ///
    /// Names are matched case-insensitively everywhere, so two engines whose
    /// names differ only in case are rejected.
    pub fn register(&mut self, engine: Box<dyn RuleEngine>) -> Result<()> {
        if self.find_by_name(engine.name()).is_some() {
            return Err(Error::DuplicateEngine {
                name: engine.name().to_string(),
            });
        }
        self.engines.push(engine);
        Ok(())
    }

    /// Initializes every engine in registration order.
    pub async fn init_all(&self, events: &EventHub) -> Result<()> {
        for engine in &self.engines {
            engine.init(events).await?;
        }
        Ok(())
    }

    /// Finds an engine by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&dyn RuleEngine> {
        self.engines.iter().find_map(|engine| {
            if engine.name().eq_ignore_ascii_case(name) {
                Some(engine.as_ref())
            } else {
                None
            }
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.engines.iter().map(|e| e.name().to_string()).collect()
    }

    /// Returns all registered engines.
    pub fn all(&self) -> &[Box<dyn RuleEngine>] {
        &self.engines
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct MockEngine {
        name: String,
    }

    #[async_trait]
    impl RuleEngine for MockEngine {
        fn name(&self) -> &str {
            &self.name
        }

        async fn catalog(&self) -> Result<EngineCatalog> {
            Ok(EngineCatalog::default())
        }

        async fn target_patterns(&self, _target: &str) -> Result<Vec<String>> {
            Ok(vec![])
        }

        async fn run(&self, _ctx: RunContext<'_>) -> Result<Vec<Violation>> {
            Ok(vec![])
        }
    }

    fn registry() -> EngineRegistry {
        let mut registry = EngineRegistry::new();
        registry
            .register(Box::new(MockEngine {
                name: "apex".to_string(),
            }))
            .unwrap();
        registry
            .register(Box::new(MockEngine {
                name: "javascript".to_string(),
            }))
            .unwrap();
        registry
    }

    #[test]
    fn test_registry_find_by_name() {
        let registry = registry();
        assert!(registry.find_by_name("apex").is_some());
        assert!(registry.find_by_name("JavaScript").is_some()); // Case insensitive
        assert!(registry.find_by_name("python").is_none());
    }

    #[test]
    fn test_registry_preserves_order() {
        let registry = registry();
        assert_eq!(registry.names(), vec!["apex", "javascript"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_rejects_names_differing_only_in_case() {
        let mut registry = registry();
        let err = registry
            .register(Box::new(MockEngine {
                name: "Apex".to_string(),
            }))
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateEngine { ref name } if name == "Apex"));
        assert!(err.is_configuration());
        assert_eq!(registry.names(), vec!["apex", "javascript"]);
    }

    #[tokio::test]
    async fn test_default_init_and_version() {
        let registry = registry();
        let events = EventHub::new();
        registry.init_all(&events).await.unwrap();
        assert_eq!(registry.all()[0].version(), "0");
    }
}
