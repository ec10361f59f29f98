//! The step interpreter: runtime context, placeholder resolution, the
//! closed action registry, phase execution and session orchestration.
//!
//! A session runs the schema's three phases with a three-tier tolerance
//! policy (`before` best-effort, `main` strict, `after` best-effort),
//! captures the page after a successful `main`, projects it into records
//! via `farescout-extract` and hands them to the persistence sink. The
//! browser handle is released on every exit path.

mod actions;
mod context;
mod interpreter;
mod resolve;
mod session;

pub use actions::{ActionHandler, ActionKind, ActionRegistry};
pub use context::RuntimeContext;
pub use interpreter::{Phase, PhaseExecutor};
pub use resolve::resolve;
pub use session::{CrawlReport, CrawlSession};
