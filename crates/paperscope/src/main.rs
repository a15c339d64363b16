//! Paperscope - Entry Point
//!
//! Serves the discovery API over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use paperscope::server::{self, AppState};
use paperscope::{Config, OpenAlexClient, PinStore};

#[derive(Parser, Debug)]
#[command(name = "paperscope")]
#[command(about = "Research-paper discovery over the OpenAlex graph")]
#[command(version)]
struct Cli {
    /// Contact email for the OpenAlex polite pool (faster, more reliable)
    #[arg(long, env = "OPENALEX_MAILTO")]
    mailto: Option<String>,

    /// HTTP server port
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Directory holding the persisted pin collection
    #[arg(long, default_value = ".", env = "PAPERSCOPE_DATA_DIR")]
    data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        port = cli.port,
        polite_pool = cli.mailto.is_some(),
        data_dir = %cli.data_dir.display(),
        "Starting paperscope"
    );

    let config = Config::new(cli.mailto, cli.data_dir.clone());
    let client = Arc::new(OpenAlexClient::new(&config)?);
    let store = PinStore::load(cli.data_dir.join("pins.json"));

    tracing::info!(pins = store.len(), groups = store.groups().len(), "Pin collection loaded");

    let state = Arc::new(AppState::new(client, store));
    server::serve(state, cli.port).await
}
