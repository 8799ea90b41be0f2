//! Batch linear referencing.
//!
//! Loads a route network and an optional reference extent table, resolves
//! every row of an input CSV to a point or line, and writes the results.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use milepost::batch::{resolve_batch_parallel, BatchResults, BatchRun};
use milepost::config::Config;
use milepost::export::export_results;
use milepost::models::{GeometryMode, MeasureUnit, ReferenceExtents};
use milepost::network::{ProjectionKind, RawNetwork, RouteIndex};
use milepost::sources::{load_extents, read_network_file, read_records_file, ArcGisLayer};
use milepost::MeasureResolver;

#[derive(Parser, Debug)]
#[command(name = "resolve")]
#[command(about = "Resolve route/measure records into point and line geometries")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input CSV file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Route network GeoJSON file
    #[arg(long)]
    network: Option<PathBuf>,

    /// ArcGIS FeatureServer layer URL for the route network
    #[arg(long)]
    network_url: Option<String>,

    /// Network column holding the route ID (detected when omitted)
    #[arg(long)]
    network_route_column: Option<String>,

    /// Projection used for measuring (local_tangent, web_mercator, identity)
    #[arg(long)]
    projection: Option<ProjectionKind>,

    /// Reference extent CSV (path or URL)
    #[arg(long)]
    reference: Option<String>,

    /// Input column with the route ID
    #[arg(long)]
    route_column: Option<String>,

    /// Input column with the begin measure
    #[arg(long)]
    begin_column: Option<String>,

    /// Input column with the end measure
    #[arg(long)]
    end_column: Option<String>,

    /// Output geometry: point, line or both
    #[arg(long)]
    mode: Option<GeometryMode>,

    /// Unit of the input measures
    #[arg(long)]
    unit: Option<MeasureUnit>,

    /// Explicit factor from input measure units to meters
    #[arg(long)]
    unit_factor: Option<f64>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Base name of the output files
    #[arg(long)]
    name: Option<String>,

    /// Resolve rows on all cores
    #[arg(long)]
    parallel: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Command line flags win over the config file
    fn apply(self, mut config: Config) -> Config {
        if let Some(path) = self.network {
            config.network.path = Some(path);
        }
        if let Some(url) = self.network_url {
            config.network.url = Some(url);
        }
        if let Some(column) = self.network_route_column {
            config.network.route_column = Some(column);
        }
        if let Some(projection) = self.projection {
            config.network.projection = projection;
        }
        if let Some(reference) = self.reference {
            config.reference.source = Some(reference);
        }
        if let Some(input) = self.input {
            config.input.path = Some(input);
        }
        if let Some(column) = self.route_column {
            config.input.columns.route_column = column;
        }
        if let Some(column) = self.begin_column {
            config.input.columns.begin_column = column;
        }
        if let Some(column) = self.end_column {
            config.input.columns.end_column = Some(column);
        }
        if let Some(mode) = self.mode {
            config.resolve.mode = mode;
        }
        if let Some(unit) = self.unit {
            config.resolve.unit = unit;
        }
        if let Some(factor) = self.unit_factor {
            config.resolve.unit_factor = Some(factor);
        }
        if self.parallel {
            config.resolve.parallel = true;
        }
        if let Some(dir) = self.output_dir {
            config.output.dir = dir;
        }
        if let Some(name) = self.name {
            config.output.name = name;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    let config = args.apply(config);

    info!("Milepost batch resolver");

    // The network is required; nothing can be resolved without it
    let raw = load_network(&config)
        .await
        .context("Failed to load route network")?;
    let projection = config.network.projection.build(raw.bounds());
    let features = raw.into_route_features(config.network.route_column.as_deref(), &projection);
    if features.is_empty() {
        anyhow::bail!("Route network has no usable features");
    }

    // The reference table only enables validation; failures degrade
    let extents = match &config.reference.source {
        Some(source) => match load_extents(source).await {
            Ok(extents) => extents,
            Err(e) => {
                warn!("Reference extents unavailable ({}); measure validation disabled", e);
                ReferenceExtents::new()
            }
        },
        None => ReferenceExtents::new(),
    };

    let index = RouteIndex::build(features).with_extents(extents);

    let input_path = config
        .input
        .path
        .as_ref()
        .context("No input file given (use --input or [input] path)")?;
    let records = read_records_file(input_path, &config.input.columns)
        .with_context(|| format!("Failed to read input {}", input_path.display()))?;

    let resolver_config = config.resolve.resolver_config()?;
    info!(
        "Resolving {} rows (mode: {}, unit factor: {})",
        records.len(),
        resolver_config.mode,
        resolver_config.unit_factor
    );
    let resolver = MeasureResolver::new(&index, resolver_config);

    let run = if config.resolve.parallel {
        resolve_batch_parallel(&resolver, &records)
    } else {
        let pb = ProgressBar::new(records.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
                .progress_chars("#>-"),
        );
        let run = BatchRun::from_outcomes(records.iter().map(|record| {
            let outcome = resolver.resolve(record);
            pb.inc(1);
            outcome
        }));
        pb.finish_with_message("Resolution complete");
        run
    };

    let mut results = BatchResults::new();
    results.absorb(run);

    let summary = results.summary();
    info!("Points mapped: {}", summary.points);
    info!("Lines mapped:  {}", summary.lines);
    info!("Errors:        {}", summary.failures);

    let written = export_results(
        &config.output.dir,
        &config.output.name,
        &results,
        &projection,
    )
    .context("Failed to write results")?;
    info!("Wrote {} output files", written.len());

    Ok(())
}

async fn load_network(config: &Config) -> Result<RawNetwork> {
    if let Some(path) = &config.network.path {
        return Ok(read_network_file(path)?);
    }

    if let Some(url) = &config.network.url {
        let layer = ArcGisLayer::new(url)?.with_page_size(config.network.page_size);
        return Ok(layer.fetch_network().await?);
    }

    anyhow::bail!("No route network given (use --network, --network-url or [network])")
}
