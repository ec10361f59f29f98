//! Step-schema data model and loader.
//!
//! A step schema is the externally stored JSON blob that drives one crawl
//! session: three phases of ordered browser steps (`before`, `main`,
//! `after`) plus declarative extraction rules. This crate owns the typed
//! shape of that blob and the [`SchemaLoader`] that fetches it from a
//! [`ConfigStore`] and validates it before any browser work begins.

mod loader;
mod types;

pub use loader::{ConfigStore, SchemaLoader};
pub use types::{
    AttributeValue, ExtractionRules, FieldRule, GroupRule, ItemsRule, Script, StepDefinition,
    StepGroup, StepSchema,
};
