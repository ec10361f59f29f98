//! Common types shared across farescout crates.
//!
//! This crate defines the error taxonomy for a crawl session and the
//! centralised tracing/logging initialisation. It is intentionally
//! lightweight so that every other crate can depend on it without pulling
//! in heavy transitive costs.
//!
//! # Overview
//!
//! - [`CrawlError`] and [`Result`]: shared error handling
//! - [`observability`]: tracing/logging setup for binaries and tests

pub mod observability;

/// Error taxonomy for a crawl session.
///
/// Configuration errors are fatal at construction: the crawl must not start
/// and no browser resource is acquired. `UnknownAction` and `StepExecution`
/// abort the current phase; they abort the whole crawl only when raised
/// during the `main` phase. `Extraction` covers rule-level failures only:
/// per-field failures never surface here, they are contained as sentinel
/// values inside the extracted records.
#[derive(thiserror::Error, Debug)]
pub enum CrawlError {
    /// The configuration store has no entry for the requested crawler key.
    #[error("no crawler configuration found for key '{0}'")]
    ConfigNotFound(String),

    /// The configuration blob is not a well-formed step schema.
    #[error("malformed crawler configuration: {0}")]
    ConfigParse(String),

    /// A step names an action identifier absent from the registry.
    #[error("unknown action '{action}' in step '{step}'")]
    UnknownAction { step: String, action: String },

    /// A known action handler returned `false` or failed.
    #[error("step '{step}' ({action}) failed: {reason}")]
    StepExecution {
        step: String,
        action: String,
        reason: String,
    },

    /// No browser session could be acquired.
    #[error("browser session unavailable: {0}")]
    BrowserUnavailable(String),

    /// Extraction could not run against the captured page.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The persistence sink rejected the extracted records.
    #[error("store error: {0}")]
    Store(String),
}

/// Convenient alias for results that use [`CrawlError`].
pub type Result<T> = std::result::Result<T, CrawlError>;
