#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch pipeline runner for the zoning map.
//!
//! `zone-map run` reads the parcel and zoning GeoJSON layers, repairs
//! and reprojects their geometries, performs the area-weighted spatial
//! join, resolves each parcel to its dominant zoning district, and
//! writes three outputs: the assignment table, the per-jurisdiction
//! summary table, and the coverage report.
//!
//! Each stage consumes the complete output of its predecessor and runs
//! to completion; a run either finishes or is restarted from its
//! inputs.

mod error;
mod ingest;
mod report;

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use zone_map_config::JurisdictionLabels;
use zone_map_geometry::NormalizeOptions;
use zone_map_rollup::{JurisdictionFilter, Metric};

use crate::error::PipelineError;

#[derive(Parser)]
#[command(name = "zone-map", about = "Parcel-to-zoning resolution and rollups")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: normalize, join, resolve, aggregate, audit.
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Parcel layer (GeoJSON FeatureCollection).
    #[arg(long)]
    parcels: PathBuf,

    /// Zoning district layer (GeoJSON FeatureCollection).
    #[arg(long)]
    zoning: PathBuf,

    /// Directory for assignments.csv, summary.csv, and coverage.json.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Restrict rollups to these jurisdiction codes (repeatable).
    /// The assignment table and coverage report are never filtered.
    #[arg(long = "jurisdiction")]
    jurisdictions: Vec<u32>,

    /// Keep only the N largest summary rows per jurisdiction by parcel
    /// count and collapse the rest into an "Other" row.
    #[arg(long)]
    top: Option<usize>,

    /// Jurisdiction label mapping, e.g. "10:Bellevue,20:Gretna".
    /// Falls back to the JURISDICTION_LABELS environment variable.
    #[arg(long)]
    labels: Option<String>,

    /// UTM zone for the working planar CRS.
    #[arg(long, default_value_t = 14)]
    utm_zone: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(&args)?,
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn run(args: &RunArgs) -> Result<(), PipelineError> {
    let labels = args
        .labels
        .clone()
        .or_else(|| std::env::var("JURISDICTION_LABELS").ok())
        .map_or_else(JurisdictionLabels::default, |raw| {
            JurisdictionLabels::parse(&raw)
        });

    let raw_parcels = ingest::read_parcels(&args.parcels)?;
    let raw_districts = ingest::read_districts(&args.zoning)?;

    let options = NormalizeOptions {
        utm_zone: args.utm_zone,
    };
    let parcels = zone_map_geometry::normalize_parcels(raw_parcels, options);
    let districts = zone_map_geometry::normalize_districts(raw_districts, options);

    let overlaps = zone_map_spatial::join(&parcels, &districts);
    let assignments = zone_map_resolve::resolve(overlaps);

    let matched = assignments.len();
    let total = parcels.len();
    let pct = if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64 * 100.0
    };
    log::info!("Join coverage: {matched}/{total} ({pct:.2}%)");

    let filter = JurisdictionFilter::from_codes(&args.jurisdictions);
    let mut summary = zone_map_rollup::summarize(&assignments, &districts, &filter);
    if let Some(n) = args.top {
        summary = zone_map_rollup::top_n_with_other(summary, n, Metric::ParcelCount);
    }

    let coverage = zone_map_coverage::audit(&parcels, &assignments);

    fs::create_dir_all(&args.out_dir)?;
    report::write_assignments(&args.out_dir.join("assignments.csv"), &assignments)?;
    report::write_summary(&args.out_dir.join("summary.csv"), &summary, &labels)?;
    report::write_coverage(&args.out_dir.join("coverage.json"), &coverage)?;

    Ok(())
}
