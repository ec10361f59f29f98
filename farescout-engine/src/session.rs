//! Session orchestration: phases, capture, extraction, persistence.

use farescout_browser::{Browser, BrowserSource};
use farescout_common::CrawlError;
use farescout_extract::{extract, PageTree, Record, RecordSink};
use farescout_schema::StepSchema;
use tracing::{error, info, warn};

use crate::actions::ActionRegistry;
use crate::context::RuntimeContext;
use crate::interpreter::{Phase, PhaseExecutor};

/// The outcome of one crawl. `start` never returns `Err`: every failure
/// mode is folded into the report so callers get a single shape to act on.
#[derive(Debug)]
pub struct CrawlReport {
    pub success: bool,
    pub records: Vec<Record>,
    pub failure: Option<String>,
}

impl CrawlReport {
    fn failed(err: impl ToString) -> Self {
        Self {
            success: false,
            records: Vec::new(),
            failure: Some(err.to_string()),
        }
    }
}

/// One crawl over one schema, against one exclusively-owned browser.
///
/// Phase tolerance is three-tier: `before` and `after` are best-effort
/// (their failures are logged and the crawl proceeds), `main` is strict.
/// The page is captured immediately after `main` succeeds, before the
/// `after` phase can navigate away from it. The browser handle is released
/// on every exit path, including capture and extraction failures.
pub struct CrawlSession<'a> {
    schema: StepSchema,
    registry: &'a ActionRegistry,
    browsers: &'a dyn BrowserSource,
    sink: &'a dyn RecordSink,
}

impl<'a> CrawlSession<'a> {
    pub fn new(
        schema: StepSchema,
        registry: &'a ActionRegistry,
        browsers: &'a dyn BrowserSource,
        sink: &'a dyn RecordSink,
    ) -> Self {
        Self {
            schema,
            registry,
            browsers,
            sink,
        }
    }

    pub async fn start(&self, ctx: &RuntimeContext) -> CrawlReport {
        // Loader enforces this too; guard again so a hand-built schema
        // cannot acquire a browser it will never use.
        if self.schema.script.main.is_empty() {
            return CrawlReport::failed(CrawlError::ConfigParse(
                "script has no main steps".to_string(),
            ));
        }

        let browser = match self.browsers.acquire().await {
            Ok(browser) => browser,
            Err(err) => {
                error!(error = %err, "could not acquire browser session");
                return CrawlReport::failed(err);
            }
        };

        let report = self.run_with_browser(browser.as_ref(), ctx).await;

        if let Err(err) = browser.close().await {
            warn!(error = %err, "browser session did not close cleanly");
        }

        report
    }

    async fn run_with_browser(&self, browser: &dyn Browser, ctx: &RuntimeContext) -> CrawlReport {
        let executor = PhaseExecutor::new(self.registry, ctx);
        let script = &self.schema.script;

        if let Err(err) = executor.run_phase(Phase::Before, &script.before, browser).await {
            warn!(error = %err, "before phase failed; continuing with main");
        }

        // Capture while the result page is still in front of us; the after
        // phase is free to navigate away or dismiss it.
        let captured_page = match executor.run_phase(Phase::Main, &script.main, browser).await {
            Ok(()) => browser
                .page_source()
                .await
                .map_err(|err| CrawlError::Extraction(format!("page capture failed: {err}"))),
            Err(err) => Err(err),
        };

        if let Err(err) = executor.run_phase(Phase::After, &script.after, browser).await {
            warn!(error = %err, "after phase failed; crawl outcome unaffected");
        }

        let page = match captured_page {
            Ok(page) => page,
            Err(err) => {
                error!(error = %err, "main phase produced no page; no extraction will run");
                return CrawlReport::failed(err);
            }
        };

        let records = match extract(&PageTree::parse(&page), &self.schema.tag) {
            Ok(records) => records,
            Err(err) => {
                error!(error = %err, "extraction failed");
                return CrawlReport::failed(err);
            }
        };
        info!(records = records.len(), "extraction complete");

        if let Err(err) = self.sink.persist(&records).await {
            error!(error = %err, "could not persist extracted records");
            return CrawlReport::failed(err);
        }

        CrawlReport {
            success: true,
            records,
            failure: None,
        }
    }
}
