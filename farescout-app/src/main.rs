use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use farescout_browser::driver::BrowserProvider;
use farescout_common::observability::{init_logging, LogSettings};
use farescout_config::FarescoutSettingsLoader;
use farescout_engine::{ActionRegistry, CrawlSession, RuntimeContext};
use farescout_schema::SchemaLoader;
use farescout_store::{MongoRecordSink, RedisConfigStore};
use tracing::{error, info};

/// Run one configuration-driven fare crawl.
#[derive(Debug, Parser)]
#[command(name = "farescout", version)]
struct Cli {
    /// Crawler key in the configuration store (e.g. "latam").
    crawler: String,

    /// Origin airport code.
    #[arg(long)]
    origin: String,

    /// Destination airport code.
    #[arg(long)]
    destination: String,

    /// Outbound date, passed through to the schema verbatim.
    #[arg(long)]
    departure_date: String,

    /// Return date for round trips.
    #[arg(long)]
    return_date: Option<String>,

    /// Settings file (YAML). Defaults and FARESCOUT_* env vars apply
    /// when omitted.
    #[arg(long, env = "FARESCOUT_SETTINGS")]
    settings: Option<PathBuf>,

    /// Override the headless flag from settings.
    #[arg(long)]
    headless: Option<bool>,

    /// Print extracted records to stdout as JSON.
    #[arg(long)]
    print_records: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = init_logging(LogSettings {
        emit_stderr: true,
        ..LogSettings::default()
    })?;
    info!(log = %log_path.display(), "farescout starting");

    let mut loader = FarescoutSettingsLoader::new();
    if let Some(path) = &cli.settings {
        loader = loader.with_file(path);
    }
    let settings = loader.load()?;

    let store = RedisConfigStore::open(&settings.store.redis_url).await?;
    let schema = SchemaLoader::new(&store).load(&cli.crawler).await?;

    let sink = MongoRecordSink::open(
        &settings.sink.mongo_uri,
        &settings.sink.database,
        &settings.sink.collection,
    )
    .await?;

    let headless = cli.headless.unwrap_or(settings.webdriver.headless);
    let browsers = BrowserProvider::new(&settings.webdriver.endpoint, headless)
        .with_interaction_timeout(Duration::from_secs(
            settings.webdriver.interaction_timeout_secs,
        ));

    let registry = ActionRegistry::builtin();
    let ctx = RuntimeContext::new(
        &cli.origin,
        &cli.destination,
        &cli.departure_date,
        cli.return_date.clone(),
    );

    let report = CrawlSession::new(schema, &registry, &browsers, &sink)
        .start(&ctx)
        .await;

    if cli.print_records {
        println!("{}", serde_json::to_string_pretty(&report.records)?);
    }

    match report.failure {
        None => {
            info!(
                crawler = %cli.crawler,
                records = report.records.len(),
                "crawl finished"
            );
            Ok(())
        }
        Some(reason) => {
            error!(crawler = %cli.crawler, %reason, "crawl failed");
            std::process::exit(1);
        }
    }
}
