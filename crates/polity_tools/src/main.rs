//! Polity Engine - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use polity_core::config::EngineConfig;
use polity_core::domain::Domain;
use polity_tools::error::Result;
use polity_tools::evaluate::{evaluate, render_json, EvaluationRequest};
use polity_tools::listing::{list_components, render_table};
use polity_tools::read_file;

#[derive(Parser)]
#[command(name = "polity-tools")]
#[command(about = "Development tools for the Polity effectiveness engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate catalog files
    Validate {
        /// Catalog file, or directory of `.ron` catalogs
        #[arg(default_value = "crates/polity_core/assets")]
        path: PathBuf,
    },
    /// List selectable components
    Components {
        /// Only this domain (government, economy, tax)
        #[arg(long)]
        domain: Option<Domain>,
        /// Only this category
        #[arg(long)]
        category: Option<String>,
        /// Catalog file to use instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Score a selection file and print the result as JSON
    Evaluate {
        /// RON evaluation request
        request: PathBuf,
        /// Catalog file to use instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// RON engine configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print every breakdown, not just the summary
        #[arg(long)]
        full: bool,
    },
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Validate { path } => {
            tracing::info!("Validating catalogs in: {}", path.display());
            let checked = polity_tools::validate::validate_data_directory(&path)?;
            tracing::info!("Validation passed ({checked} files)");
        }
        Commands::Components {
            domain,
            category,
            catalog,
            json,
        } => {
            let registry = polity_tools::load_registry(catalog.as_deref())?;
            let rows = list_components(&registry, domain, category.as_deref());
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", render_table(&rows));
            }
        }
        Commands::Evaluate {
            request,
            catalog,
            config,
            full,
        } => {
            let registry = polity_tools::load_registry(catalog.as_deref())?;
            let config = match config {
                Some(path) => {
                    let contents = read_file(&path)?;
                    EngineConfig::from_ron_str(&contents, &path.display().to_string())?
                }
                None => EngineConfig::default(),
            };
            let contents = read_file(&request)?;
            let parsed = EvaluationRequest::from_ron_str(&contents, &request.display().to_string())?;
            let state = evaluate(&registry, &config, &parsed)?;
            println!("{}", render_json(&state, full)?);
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
