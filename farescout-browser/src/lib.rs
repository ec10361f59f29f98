//! Browser collaborator for a crawl session.
//!
//! The [`Browser`] trait is the seam between the step interpreter and any
//! concrete automation backend: action handlers only ever see this trait.
//! [`driver::WebDriverBrowser`] is the production implementation on top of
//! `fantoccini`, acquired through [`driver::BrowserProvider`].

pub mod driver;

use async_trait::async_trait;

/// Special keys a step may press. The closed set mirrors what schemas are
/// allowed to name in a `press_key` step's `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressKey {
    Enter,
    Return,
    Escape,
}

impl PressKey {
    /// Parse the wire value (case-insensitive). Unknown names are a step
    /// failure, not a panic.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "enter" => Some(Self::Enter),
            "return" => Some(Self::Return),
            "escape" => Some(Self::Escape),
            _ => None,
        }
    }
}

/// One browser session, exclusively owned by the crawl that created it.
///
/// Interactive operations block on a bounded explicit-condition wait for
/// the target element; exceeding that wait is an `Err`, which the phase
/// executor normalizes into a step failure. `close` must be called exactly
/// once on every exit path; the session orchestrator owns that discipline.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigate to an absolute URL.
    async fn navigate(&self, url: &str) -> anyhow::Result<()>;

    /// Clear then type `text` into the element at `xpath`.
    async fn fill(&self, xpath: &str, text: &str) -> anyhow::Result<()>;

    /// Click the element at `xpath`.
    async fn click(&self, xpath: &str) -> anyhow::Result<()>;

    /// Press a special key on the element at `xpath`, or on the currently
    /// focused element when no selector is given.
    async fn press_key(&self, xpath: Option<&str>, key: PressKey) -> anyhow::Result<()>;

    /// The current page markup.
    async fn page_source(&self) -> anyhow::Result<String>;

    /// Release the underlying session.
    async fn close(&self) -> anyhow::Result<()>;
}

/// Acquires one [`Browser`] per crawl session.
///
/// Failure means no crawl at all; the session reports
/// [`farescout_common::CrawlError::BrowserUnavailable`] without running any
/// phase.
#[async_trait]
pub trait BrowserSource: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn Browser>, farescout_common::CrawlError>;
}
