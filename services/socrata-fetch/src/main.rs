//! Fetch one Socrata dataset and print it as GeoJSON with layer metadata.
//!
//! Runs the same pipeline a feature-service host would run for a single
//! query request, which makes it handy for checking how a dataset id
//! resolves on a given domain.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use socrata_provider::{DataRequest, Model, ProviderConfig, QueryParams};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "socrata-fetch")]
#[command(about = "Fetch a Socrata dataset as a GeoJSON FeatureCollection")]
struct Args {
    /// Dataset id (e.g. tmnf-yvry)
    id: String,

    /// Socrata domain (default: configured default host)
    #[arg(long)]
    host: Option<String>,

    /// SoQL where clause
    #[arg(long = "where")]
    where_clause: Option<String>,

    /// Number of records to skip
    #[arg(long)]
    result_offset: Option<String>,

    /// Maximum number of records to return
    #[arg(long)]
    result_record_count: Option<String>,

    /// Ordering, e.g. "name DESC,created_at"
    #[arg(long)]
    order_by_fields: Option<String>,

    /// YAML configuration file (default: environment)
    #[arg(long, env = "SOCRATA_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays valid GeoJSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match args.config {
        Some(ref path) => ProviderConfig::load(path),
        None => ProviderConfig::from_env(),
    }
    .context("Failed to load provider configuration")?;

    let model = Model::from_config(config).context("Failed to create provider")?;

    let mut request = DataRequest::new(&args.id).with_query(QueryParams {
        where_clause: args.where_clause,
        result_offset: args.result_offset,
        result_record_count: args.result_record_count,
        order_by_fields: args.order_by_fields,
    });
    request.params.host = args.host;

    let host = model.host_for(&request).context("Invalid --host")?;
    info!(id = %args.id, host = %host.base_url(), "Fetching dataset");

    let collection = model
        .get_data(&request)
        .await
        .with_context(|| format!("Failed to fetch dataset {}", args.id))?;

    info!(
        features = collection.len(),
        has_metadata = collection.metadata.is_some(),
        "Fetched dataset"
    );

    let output = if args.pretty {
        serde_json::to_string_pretty(&collection)?
    } else {
        serde_json::to_string(&collection)?
    };
    println!("{}", output);

    Ok(())
}
