//! Loader for farescout application settings with YAML + environment overlays.
//!
//! Settings describe the *surroundings* of a crawl session: where the
//! WebDriver endpoint lives, which Redis instance holds the step schemas,
//! and which Mongo collection receives extracted records. The step schemas
//! themselves are not configured here; they are fetched by key at session
//! construction (see `farescout-schema`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level application settings.
#[derive(Debug, Deserialize)]
pub struct FarescoutSettings {
    pub version: Option<String>,
    #[serde(default)]
    pub webdriver: WebdriverSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub sink: SinkSettings,
}

/// Where the WebDriver service lives and how interactions behave.
#[derive(Debug, Deserialize)]
pub struct WebdriverSettings {
    #[serde(default = "default_webdriver_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// Bounded explicit-condition wait applied to interactive actions.
    #[serde(default = "default_interaction_timeout_secs")]
    pub interaction_timeout_secs: u64,
}

/// The key→blob configuration store holding step schemas.
#[derive(Debug, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

/// The persistence sink for extracted records.
#[derive(Debug, Deserialize)]
pub struct SinkSettings {
    #[serde(default = "default_mongo_uri")]
    pub mongo_uri: String,
    #[serde(default = "default_mongo_database")]
    pub database: String,
    #[serde(default = "default_mongo_collection")]
    pub collection: String,
}

impl Default for WebdriverSettings {
    fn default() -> Self {
        Self {
            endpoint: default_webdriver_endpoint(),
            headless: default_headless(),
            interaction_timeout_secs: default_interaction_timeout_secs(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
        }
    }
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            mongo_uri: default_mongo_uri(),
            database: default_mongo_database(),
            collection: default_mongo_collection(),
        }
    }
}

fn default_webdriver_endpoint() -> String {
    "http://localhost:9515".into()
}
fn default_headless() -> bool {
    true
}
fn default_interaction_timeout_secs() -> u64 {
    15
}
fn default_redis_url() -> String {
    "redis://localhost:6379".into()
}
fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".into()
}
fn default_mongo_database() -> String {
    "crawler_airlines".into()
}
fn default_mongo_collection() -> String {
    "airlines_data".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct FarescoutSettingsLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for FarescoutSettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FarescoutSettingsLoader {
    /// Start with sensible defaults: YAML file + `FARESCOUT_` env overrides.
    ///
    /// ```
    /// use farescout_config::FarescoutSettingsLoader;
    ///
    /// let settings = FarescoutSettingsLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid settings");
    ///
    /// assert_eq!(settings.version.as_deref(), Some("1"));
    /// assert_eq!(settings.webdriver.interaction_timeout_secs, 15);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("FARESCOUT").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet (tests, CLI overrides).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// `${VAR}` placeholders are expanded recursively before the strongly
    /// typed settings are materialised, so secrets can stay in the
    /// environment.
    pub fn load(self) -> Result<FarescoutSettings, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
