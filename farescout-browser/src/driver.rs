//! Fantoccini-backed WebDriver session.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::key::Key;
use fantoccini::{Client, ClientBuilder, Locator};
use farescout_common::CrawlError;
use serde_json::json;
use tracing::{debug, info};
use webdriver::capabilities::Capabilities;

use crate::{Browser, BrowserSource, PressKey};

/// Bounded wait applied to interactive actions when settings don't override it.
pub const DEFAULT_INTERACTION_TIMEOUT: Duration = Duration::from_secs(15);

/// Builds Chrome capabilities and acquires one WebDriver session per crawl.
#[derive(Debug, Clone)]
pub struct BrowserProvider {
    endpoint: String,
    headless: bool,
    interaction_timeout: Duration,
}

impl BrowserProvider {
    /// Provider for a WebDriver service (typically chromedriver) at `endpoint`.
    pub fn new(endpoint: impl Into<String>, headless: bool) -> Self {
        Self {
            endpoint: endpoint.into(),
            headless,
            interaction_timeout: DEFAULT_INTERACTION_TIMEOUT,
        }
    }

    /// Override the bounded wait applied to interactive actions.
    pub fn with_interaction_timeout(mut self, timeout: Duration) -> Self {
        self.interaction_timeout = timeout;
        self
    }

    /// Connect a fresh session. Failure here means no crawl: the caller gets
    /// [`CrawlError::BrowserUnavailable`] and must not run any phase.
    pub async fn connect(&self) -> Result<WebDriverBrowser, CrawlError> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();

        let mut args = default_chrome_args();
        if self.headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
        }
        chrome_opts.insert("args".to_string(), json!(args));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        info!(endpoint = %self.endpoint, headless = self.headless, "acquiring webdriver session");
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&self.endpoint)
            .await
            .map_err(|e| CrawlError::BrowserUnavailable(e.to_string()))?;

        Ok(WebDriverBrowser {
            client,
            interaction_timeout: self.interaction_timeout,
        })
    }
}

#[async_trait]
impl BrowserSource for BrowserProvider {
    async fn acquire(&self) -> Result<Box<dyn Browser>, CrawlError> {
        Ok(Box::new(self.connect().await?))
    }
}

/// Hardening/automation arguments carried by every session.
fn default_chrome_args() -> Vec<String> {
    [
        "--no-sandbox",
        "--disable-setuid-sandbox",
        "--disable-web-security",
        "--disable-dev-shm-usage",
        "--memory-pressure-off",
        "--ignore-certificate-errors",
        "--incognito",
        "--disable-blink-features=AutomationControlled",
        "--user-agent=Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
        "--disable-infobars",
        "--window-size=1920,1080",
        "--log-level=0",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct WebDriverBrowser {
    client: Client,
    interaction_timeout: Duration,
}

impl WebDriverBrowser {
    /// Wait (bounded) for the element at `xpath` to be present.
    async fn wait_for(&self, xpath: &str) -> Result<Element> {
        let element = self
            .client
            .wait()
            .at_most(self.interaction_timeout)
            .for_element(Locator::XPath(xpath))
            .await?;
        Ok(element)
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        self.client.goto(url).await?;
        Ok(())
    }

    async fn fill(&self, xpath: &str, text: &str) -> Result<()> {
        debug!(xpath, "typing into element");
        let element = self.wait_for(xpath).await?;
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn click(&self, xpath: &str) -> Result<()> {
        debug!(xpath, "clicking element");
        let element = self.wait_for(xpath).await?;
        element.click().await?;
        Ok(())
    }

    async fn press_key(&self, xpath: Option<&str>, key: PressKey) -> Result<()> {
        let target = match xpath {
            Some(x) => {
                debug!(xpath = x, ?key, "pressing key on element");
                self.wait_for(x).await?
            }
            None => {
                debug!(?key, "pressing key on active element");
                self.client.active_element().await?
            }
        };
        let key = match key {
            PressKey::Enter => Key::Enter,
            PressKey::Return => Key::Return,
            PressKey::Escape => Key::Escape,
        };
        target.send_keys(&char::from(key).to_string()).await?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        let html = self.client.source().await?;
        Ok(html)
    }

    async fn close(&self) -> Result<()> {
        // Client is a handle; closing one clone tears down the session.
        self.client.clone().close().await?;
        Ok(())
    }
}
