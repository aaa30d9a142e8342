//! Sift Core - domain types and the rule engine contract.
//!
//! This crate provides the foundational types shared by every stage of
//! sift's analysis pipeline:
//!
//! - [`RuleEngine`]: Trait implemented by pluggable rule engines
//! - [`EngineRegistry`]: Engines in registration order
//! - [`Rule`], [`Catalog`], [`RuleSelection`]: What to run
//! - [`RuleTarget`], [`Violation`]: Where to run it and what was found
//! - [`RecombinedRuleResults`]: The merged, formatted outcome
//! - [`EventHub`]: Typed listener arena for non-fatal events
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    sift-cli     │  (commands, writers, viewers)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  sift-pipeline  │  (catalog → selector → targets → dispatch → recombine)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   sift-core     │  (This crate - types and engine contract)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ engine crates   │  (sift-engine-pattern, ...)
//! └─────────────────┘
//! ```

pub mod engine;
pub mod error;
pub mod events;
pub mod results;
pub mod selection;
pub mod types;

// Re-export core types for convenience
pub use engine::{EngineCatalog, EngineRegistry, RuleEngine, RunContext};
pub use error::{Error, Result};
pub use events::{Event, EventHub, EventLevel, EventListener, EventLog, ListenerId};
pub use results::{EngineSummary, RecombinedData, RecombinedRuleResults};
pub use selection::{EnginePartition, RuleSelection};
pub use types::{Catalog, Rule, RuleDescriptor, RuleGroup, RuleTarget, Severity, Violation};
