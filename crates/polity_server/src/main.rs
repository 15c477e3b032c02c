//! Polity Server - JSON-lines requests on stdin, responses on stdout

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use polity_server::config::{RecordFormat, ServerConfig};
use polity_server::error::Result;
use polity_server::service::PolityService;
use polity_server::{build_manager, open_store, serve, spawn_stats_logger};

#[derive(Parser, Debug)]
#[command(name = "polity-server")]
#[command(about = "Serve effectiveness requests over stdin/stdout")]
struct Args {
    /// Server configuration file (RON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Component catalog file, overrides the configuration
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Directory for persisted countries, overrides the configuration
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Write human-readable RON records instead of bincode
    #[arg(long)]
    ron_records: bool,
}

async fn load_config(args: &Args) -> Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path).await?;
            ServerConfig::from_ron_str(&contents)?
        }
        None => ServerConfig::default(),
    };
    if args.catalog.is_some() {
        config.catalog_path.clone_from(&args.catalog);
    }
    if args.data_dir.is_some() {
        config.data_dir.clone_from(&args.data_dir);
    }
    if args.ron_records {
        config.record_format = RecordFormat::Ron;
    }
    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args).await?;
    let manager = build_manager(&config).await?;
    let store = open_store(&config).await?;

    let service = PolityService::new(std::sync::Arc::new(manager), store);
    service.restore_all().await?;
    let stats_task = spawn_stats_logger(&service, config.stats_interval_secs);

    tracing::info!("Polity server ready");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = serve(&service, stdin, tokio::io::stdout()).await;
    service.flush().await;

    if let Some(task) = stats_task {
        task.abort();
    }
    result
}

#[tokio::main]
async fn main() {
    // stdout carries responses, so logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Polity server");

    if let Err(e) = run(Args::parse()).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
