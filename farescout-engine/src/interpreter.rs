//! Deterministic step ordering and single-phase execution.

use farescout_browser::Browser;
use farescout_common::{CrawlError, Result};
use farescout_schema::{StepDefinition, StepGroup};
use tracing::{debug, info};

use crate::actions::{ActionKind, ActionRegistry};
use crate::context::RuntimeContext;
use crate::resolve::resolve;

/// The three phases of a crawl script, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Before,
    Main,
    After,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::Main => "main",
            Phase::After => "after",
        }
    }
}

/// Sort key for a step name: `step-N` names order by N ascending and come
/// before everything else; remaining names order lexicographically.
fn step_rank(name: &str) -> (u8, u64, &str) {
    match name.strip_prefix("step-").and_then(|n| n.parse::<u64>().ok()) {
        Some(n) => (0, n, name),
        None => (1, 0, name),
    }
}

/// The execution order of a phase, derived from step names rather than the
/// map's native order. `step-10` sorts after `step-2`.
pub fn ordered_steps(group: &StepGroup) -> Vec<(&str, &StepDefinition)> {
    let mut steps: Vec<(&str, &StepDefinition)> =
        group.iter().map(|(name, step)| (name.as_str(), step)).collect();
    steps.sort_by(|(a, _), (b, _)| step_rank(a).cmp(&step_rank(b)));
    steps
}

/// Runs one phase of a script against a browser, fail-fast.
///
/// Each step's attributes are resolved against the runtime context just
/// before dispatch. The first failing step aborts the phase: an identifier
/// outside the action set is [`CrawlError::UnknownAction`], a handler that
/// returns `false` or errors is [`CrawlError::StepExecution`]. Tolerance of
/// phase failures is the session's business, not ours.
pub struct PhaseExecutor<'a> {
    registry: &'a ActionRegistry,
    ctx: &'a RuntimeContext,
}

impl<'a> PhaseExecutor<'a> {
    pub fn new(registry: &'a ActionRegistry, ctx: &'a RuntimeContext) -> Self {
        Self { registry, ctx }
    }

    pub async fn run_phase(
        &self,
        phase: Phase,
        group: &StepGroup,
        browser: &dyn Browser,
    ) -> Result<()> {
        let steps = ordered_steps(group);
        info!(phase = phase.as_str(), steps = steps.len(), "running phase");

        for (name, step) in steps {
            let Some(kind) = ActionKind::from_wire(&step.action) else {
                return Err(CrawlError::UnknownAction {
                    step: name.to_string(),
                    action: step.action.clone(),
                });
            };
            // builtin() covers the closed set; a custom registry may not.
            let Some(handler) = self.registry.get(kind) else {
                return Err(CrawlError::UnknownAction {
                    step: name.to_string(),
                    action: step.action.clone(),
                });
            };

            debug!(phase = phase.as_str(), step = name, action = kind.as_str(), "dispatching step");
            let att = resolve(&step.att, self.ctx);
            match handler.run(browser, &att).await {
                Ok(true) => {}
                Ok(false) => {
                    return Err(CrawlError::StepExecution {
                        step: name.to_string(),
                        action: step.action.clone(),
                        reason: "handler reported failure".to_string(),
                    });
                }
                Err(err) => {
                    return Err(CrawlError::StepExecution {
                        step: name.to_string(),
                        action: step.action.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_of(names: &[&str]) -> StepGroup {
        names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    StepDefinition {
                        action: "wait".to_string(),
                        att: farescout_schema::AttributeValue::Scalar("0".into()),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn numeric_suffixes_order_numerically() {
        let group = group_of(&["step-10", "step-2", "step-1"]);
        let names: Vec<&str> = ordered_steps(&group).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["step-1", "step-2", "step-10"]);
    }

    #[test]
    fn non_conforming_names_sort_after_numbered_steps() {
        let group = group_of(&["teardown", "step-2", "cleanup", "step-1"]);
        let names: Vec<&str> = ordered_steps(&group).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["step-1", "step-2", "cleanup", "teardown"]);
    }

    #[test]
    fn ordering_is_insertion_independent() {
        let a = group_of(&["step-3", "step-1", "step-2"]);
        let b = group_of(&["step-2", "step-3", "step-1"]);
        let names_a: Vec<&str> = ordered_steps(&a).into_iter().map(|(n, _)| n).collect();
        let names_b: Vec<&str> = ordered_steps(&b).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names_a, names_b);
    }
}
