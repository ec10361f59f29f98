//! The closed action set and its registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use farescout_browser::{Browser, PressKey};
use farescout_schema::AttributeValue;
use tracing::{info, warn};

/// Closed identifier set for dispatchable actions. Wire identifiers outside
/// this set are a typed lookup error at dispatch, not a key miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Goto,
    Input,
    ClickElement,
    PressKey,
    Wait,
}

impl ActionKind {
    /// Map a schema's wire identifier onto the closed set.
    pub fn from_wire(id: &str) -> Option<Self> {
        match id {
            "goto" => Some(Self::Goto),
            "input" => Some(Self::Input),
            "click_element" => Some(Self::ClickElement),
            "press_key" => Some(Self::PressKey),
            "wait" => Some(Self::Wait),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goto => "goto",
            Self::Input => "input",
            Self::ClickElement => "click_element",
            Self::PressKey => "press_key",
            Self::Wait => "wait",
        }
    }
}

/// Uniform handler contract: run against the browser with the step's
/// resolved attributes. `Ok(false)` and `Err` are both step failures; the
/// phase executor normalizes them.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn run(&self, browser: &dyn Browser, att: &AttributeValue) -> Result<bool>;
}

/// Immutable mapping from [`ActionKind`] to its handler. Populated at
/// construction; the interpreter only ever reads it.
pub struct ActionRegistry {
    handlers: HashMap<ActionKind, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new(handlers: HashMap<ActionKind, Arc<dyn ActionHandler>>) -> Self {
        Self { handlers }
    }

    /// The five built-in actions.
    pub fn builtin() -> Self {
        let mut handlers: HashMap<ActionKind, Arc<dyn ActionHandler>> = HashMap::new();
        handlers.insert(ActionKind::Goto, Arc::new(GotoAction));
        handlers.insert(ActionKind::Input, Arc::new(InputAction));
        handlers.insert(ActionKind::ClickElement, Arc::new(ClickAction));
        handlers.insert(ActionKind::PressKey, Arc::new(PressKeyAction));
        handlers.insert(ActionKind::Wait, Arc::new(WaitAction));
        Self { handlers }
    }

    pub fn get(&self, kind: ActionKind) -> Option<&dyn ActionHandler> {
        self.handlers.get(&kind).map(Arc::as_ref)
    }
}

/// Navigate to the scalar URL in `att`.
struct GotoAction;

#[async_trait]
impl ActionHandler for GotoAction {
    async fn run(&self, browser: &dyn Browser, att: &AttributeValue) -> Result<bool> {
        let Some(url) = att.as_str() else {
            bail!("goto requires a scalar url attribute");
        };
        info!(url, "navigating");
        browser.navigate(url).await?;
        Ok(true)
    }
}

/// Type `value` into the element at `element`.
struct InputAction;

#[async_trait]
impl ActionHandler for InputAction {
    async fn run(&self, browser: &dyn Browser, att: &AttributeValue) -> Result<bool> {
        let Some(element) = att.str_of("element") else {
            bail!("input requires an 'element' selector attribute");
        };
        let value = att.str_of("value").unwrap_or_default();
        browser.fill(element, value).await?;
        Ok(true)
    }
}

/// Click the element at `element`.
struct ClickAction;

#[async_trait]
impl ActionHandler for ClickAction {
    async fn run(&self, browser: &dyn Browser, att: &AttributeValue) -> Result<bool> {
        let Some(element) = att.str_of("element") else {
            bail!("click_element requires an 'element' selector attribute");
        };
        browser.click(element).await?;
        Ok(true)
    }
}

/// Press the special key named by `value`, optionally on `element`.
struct PressKeyAction;

#[async_trait]
impl ActionHandler for PressKeyAction {
    async fn run(&self, browser: &dyn Browser, att: &AttributeValue) -> Result<bool> {
        let name = att.str_of("value").unwrap_or_default();
        let Some(key) = PressKey::parse(name) else {
            bail!("unsupported key '{name}' (supported: enter, return, escape)");
        };
        browser.press_key(att.str_of("element"), key).await?;
        Ok(true)
    }
}

/// Unconditional sleep for the scalar number of seconds in `att`.
///
/// This is the one action with no explicit condition; schemas should prefer
/// the implicit bounded waits of the interactive actions.
struct WaitAction;

#[async_trait]
impl ActionHandler for WaitAction {
    async fn run(&self, _browser: &dyn Browser, att: &AttributeValue) -> Result<bool> {
        let raw = att.as_str().unwrap_or_default();
        let Ok(seconds) = raw.parse::<i64>() else {
            bail!("invalid wait duration '{raw}': must be an integer number of seconds");
        };
        if seconds <= 0 {
            warn!(seconds, "wait duration is not positive; skipping");
            return Ok(true);
        }
        info!(seconds, "static wait");
        tokio::time::sleep(Duration::from_secs(seconds as u64)).await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_identifiers_round_trip() {
        for id in ["goto", "input", "click_element", "press_key", "wait"] {
            let kind = ActionKind::from_wire(id).unwrap();
            assert_eq!(kind.as_str(), id);
        }
        assert_eq!(ActionKind::from_wire("teleport"), None);
    }

    #[test]
    fn builtin_registry_covers_the_closed_set() {
        let registry = ActionRegistry::builtin();
        for kind in [
            ActionKind::Goto,
            ActionKind::Input,
            ActionKind::ClickElement,
            ActionKind::PressKey,
            ActionKind::Wait,
        ] {
            assert!(registry.get(kind).is_some(), "missing handler for {kind:?}");
        }
    }
}
