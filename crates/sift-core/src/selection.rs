//! Rule selections partitioned by engine.

use crate::types::{Rule, RuleGroup};

/// The rules and groups one engine will run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePartition {
    pub engine: String,
    pub groups: Vec<RuleGroup>,
    pub rules: Vec<Rule>,
}

/// An ordered, de-duplicated set of rules grouped by engine.
///
/// Partitions follow engine registration order; rules within a partition
/// follow catalog discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSelection {
    partitions: Vec<EnginePartition>,
}

impl RuleSelection {
    /// Build a selection from partitions already in registration order.
    /// Empty partitions are dropped.
    pub fn new(partitions: Vec<EnginePartition>) -> Self {
        Self {
            partitions: partitions
                .into_iter()
                .filter(|p| !p.rules.is_empty())
                .collect(),
        }
    }

    pub fn partitions(&self) -> &[EnginePartition] {
        &self.partitions
    }

    /// Names of engines with at least one selected rule.
    pub fn engines(&self) -> Vec<&str> {
        self.partitions.iter().map(|p| p.engine.as_str()).collect()
    }

    pub fn for_engine(&self, engine: &str) -> Option<&EnginePartition> {
        self.partitions.iter().find(|p| p.engine == engine)
    }

    /// All selected rules, flattened in partition order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.partitions.iter().flat_map(|p| p.rules.iter())
    }

    pub fn len(&self) -> usize {
        self.partitions.iter().map(|p| p.rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}
