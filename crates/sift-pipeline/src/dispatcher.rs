//! Concurrent, all-or-nothing engine dispatch.

use crate::targets::EngineTargets;
use futures::future::try_join_all;
use sift_core::{
    EngineRegistry, Error, EventHub, Result, RuleSelection, RunContext, Violation,
};
use tracing::{debug, info};

/// Violations produced by one engine, in the engine's own emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineBatch {
    pub engine: String,
    pub violations: Vec<Violation>,
}

/// Runs every engine with a non-empty partition.
///
/// All runs start together and are joined with a single wait. If any engine
/// rejects, the whole dispatch rejects and no batch is returned.
pub struct Dispatcher<'a> {
    registry: &'a EngineRegistry,
    events: &'a EventHub,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a EngineRegistry, events: &'a EventHub) -> Self {
        Self { registry, events }
    }

    /// Batches come back in selection partition order.
    pub async fn dispatch(
        &self,
        selection: &RuleSelection,
        targets: &EngineTargets,
    ) -> Result<Vec<EngineBatch>> {
        let mut runs = Vec::with_capacity(selection.partitions().len());

        for partition in selection.partitions() {
            let engine = self
                .registry
                .find_by_name(&partition.engine)
                .ok_or_else(|| Error::EngineNotFound {
                    name: partition.engine.clone(),
                })?;
            let engine_targets = targets
                .get(&partition.engine)
                .map(Vec::as_slice)
                .unwrap_or_default();

            debug!(
                "Dispatching {} rule(s) to {} over {} target(s)",
                partition.rules.len(),
                partition.engine,
                engine_targets.len()
            );

            let ctx = RunContext {
                groups: &partition.groups,
                rules: &partition.rules,
                targets: engine_targets,
                events: self.events,
            };
            let name = partition.engine.clone();

            runs.push(async move {
                let violations = engine.run(ctx).await.map_err(|e| match e {
                    failed @ Error::EngineFailed { .. } => failed,
                    other => Error::EngineFailed {
                        engine: name.clone(),
                        message: other.to_string(),
                    },
                })?;
                Ok::<_, Error>(EngineBatch {
                    engine: name,
                    violations,
                })
            });
        }

        let batches = try_join_all(runs).await?;
        info!(
            "Dispatch finished: {} engine(s), {} violation(s)",
            batches.len(),
            batches.iter().map(|b| b.violations.len()).sum::<usize>()
        );
        Ok(batches)
    }
}
