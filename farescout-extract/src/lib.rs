//! Structured extraction from captured page markup.
//!
//! After the `main` phase the session captures the page source once; this
//! crate projects that markup into normalized [`Record`]s by applying the
//! schema's XPath-style rules: container nodes, a relative item drill-down,
//! then per-item field paths with multiplicity derived from match count.
//!
//! Failures are contained at field granularity: a bad field path yields an
//! error sentinel in that field and never aborts the item or the session.

mod engine;
mod record;
mod xpath;

pub use engine::extract;
pub use record::{FieldValue, Record, RecordSink};
pub use xpath::{PageTree, XPathError, XPathExpr};
