//! Command-line driver for the octree outlier filter.
//!
//! Loads a point cloud, drops the points in sparse cells and writes the rest
//! back with all of their attributes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use octfilter_core::{
    classify, AxisBounds, FilterConfig, FilterParams, NeighborStencil, PlyEncoding,
    PointCloudFile,
};

mod logging;

#[derive(Parser, Debug)]
#[command(name = "octfilter")]
#[command(about = "Removes outlier points from a point cloud", long_about = None)]
struct Args {
    /// Input point cloud (.ply, .xyz, .txt, .csv or .pts)
    input: PathBuf,

    /// Output point cloud; the extension picks the format
    #[arg(short, long)]
    output: PathBuf,

    /// Cell width, comparable to the radius of a radius outlier filter
    #[arg(short, long)]
    cube_size: f64,

    /// Keep points whose own cell holds more points than this (1-20 recommended)
    #[arg(long, default_value = "5", allow_negative_numbers = true)]
    own_threshold: i64,

    /// Keep points whose weighted neighbor count exceeds this (0-1000 recommended)
    #[arg(long, default_value = "5", allow_negative_numbers = true)]
    neighbor_threshold: i64,

    /// JSON file with engine settings (memory budget, neighbor weights and stencil)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the published neighbor stencil and combined-code bounds check
    #[arg(long)]
    reference_stencil: bool,

    /// Write PLY output as binary little endian instead of the input encoding
    #[arg(long)]
    binary: bool,

    /// Write the filter report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log grid depth and cell statistics
    #[arg(short, long)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup_tracing(logging::level_for(args.verbose, args.quiet));
    run(&args)
}

fn load_config(args: &Args) -> Result<FilterConfig> {
    let mut config = match &args.config {
        Some(path) => FilterConfig::load(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FilterConfig::default(),
    };
    if args.reference_stencil {
        config.density.bounds = AxisBounds::CodeRange;
        config.density.stencil = NeighborStencil::Reference;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let mut cloud = PointCloudFile::load(&args.input)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    tracing::info!("loaded {} points from {}", cloud.len(), args.input.display());

    let params = FilterParams::new(args.cube_size, args.own_threshold, args.neighbor_threshold)
        .with_verbose(args.verbose);
    let (mask, report) =
        classify(&cloud.positions(), &params, &config).context("Filtering failed")?;
    cloud.retain(&mask);

    let encoding = args.binary.then_some(PlyEncoding::BinaryLittleEndian);
    cloud
        .save(&args.output, encoding)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!(
        "kept {} of {} points ({} removed) at depth {}",
        report.kept_len,
        report.input_len,
        report.removed_len(),
        report.depth.depth
    );

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }
    Ok(())
}
