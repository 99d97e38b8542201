//! scarf: generate, export and analyse scarf-joint spirals.
//!
//! Grows an ellipse family outward until it meets a bounding ellipse, or
//! shrinks one inward until it collapses into the origin, and writes the
//! stitched path as CSV and/or SVG. The `stats` subcommand checks the
//! point spacing of an existing CSV file.
//!
//! # Usage
//!
//! ```text
//! scarf grow --a 60 --b 2 --step 5 --bound-scale 21 --csv ellipse_points.csv
//! scarf shrink --a 50 --b 100 --step 5 --svg spiral.svg
//! scarf stats ellipse_points.csv --distances distances.csv
//! ```
//!
//! Log verbosity follows `RUST_LOG` when set, otherwise `-v` flags.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use scarf_export::{CsvLayout, CsvOptions, CsvTable, SvgMetadata};
use scarf_spiral::analysis::PathStats;
use scarf_spiral::{
    Curve, CurveParameters, CurveSampler, Resolution, RunSummary, SamplingKind, SpiralConfig,
    Termination,
};

/// Default inward seed `(50, 100)`.
const DEFAULT_INWARD_A: f64 = 50.0;
const DEFAULT_INWARD_B: f64 = 100.0;

/// Crates whose log output the `-v` flags control.
const LOG_TARGETS: &[&str] = &["scarf", "scarf_spiral", "scarf_export"];

/// Stitch ellipse families into one continuous spiral path.
#[derive(Parser)]
#[command(name = "scarf", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grow outward from a seed ellipse until a bounding ellipse is reached.
    Grow(GrowArgs),
    /// Shrink inward from a seed ellipse and finish at the origin.
    Shrink(ShrinkArgs),
    /// Print spacing statistics for a point CSV file.
    Stats(StatsArgs),
}

#[derive(Args)]
struct GrowArgs {
    /// Seed semi-axis along X.
    #[arg(long, default_value_t = SpiralConfig::DEFAULT_SEED.a())]
    a: f64,

    /// Seed semi-axis along Y.
    #[arg(long, default_value_t = SpiralConfig::DEFAULT_SEED.b())]
    b: f64,

    /// Growth of both semi-axes per curve.
    #[arg(long, default_value_t = SpiralConfig::DEFAULT_STEP)]
    step: f64,

    /// Bounding ellipse semi-axis along X.
    #[arg(long, requires = "bound_b")]
    bound_a: Option<f64>,

    /// Bounding ellipse semi-axis along Y.
    #[arg(long, requires = "bound_a")]
    bound_b: Option<f64>,

    /// Bounding ellipse as a multiple of the seed, when no explicit
    /// bound is given.
    #[arg(long, default_value_t = SpiralConfig::DEFAULT_BOUND_SCALE, conflicts_with_all = ["bound_a", "bound_b"])]
    bound_scale: f64,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Args)]
struct ShrinkArgs {
    /// Seed semi-axis along X.
    #[arg(long, default_value_t = DEFAULT_INWARD_A)]
    a: f64,

    /// Seed semi-axis along Y.
    #[arg(long, default_value_t = DEFAULT_INWARD_B)]
    b: f64,

    /// Shrink of both semi-axes per curve.
    #[arg(long, default_value_t = SpiralConfig::DEFAULT_STEP)]
    step: f64,

    #[command(flatten)]
    generate: GenerateArgs,
}

/// Flags shared by `grow` and `shrink`.
#[derive(Args)]
struct GenerateArgs {
    /// How points are placed along each curve.
    #[arg(long, value_enum, default_value_t = Sampling::UniformAngle)]
    sampling: Sampling,

    /// Exact number of samples per curve.
    #[arg(long, conflicts_with = "spacing")]
    count: Option<usize>,

    /// Target distance between samples; the count follows from the
    /// largest curve's perimeter.
    #[arg(long)]
    spacing: Option<f64>,

    /// Include the seed curve itself in the output.
    #[arg(long)]
    export_seed: bool,

    /// Iteration cap (derived from the step when omitted).
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Keep every n-th point in the CSV.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    stride: usize,

    /// Shift the exported path up by this percentage of the step.
    #[arg(long, default_value_t = 0.0)]
    y_offset_percent: f64,

    /// Write an `X,Y,Z` CSV with this constant Z (use `--z=-1` for
    /// negative values).
    #[arg(long)]
    z: Option<f64>,

    /// Write the path as CSV to this file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the path as SVG to this file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print the run summary as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Spiral config overrides as a JSON object.
    ///
    /// Fields present in the object replace the values built from the
    /// other flags; missing fields keep them. A `direction` that differs
    /// from the subcommand is rejected.
    #[arg(long)]
    config_json: Option<String>,
}

#[derive(Args)]
struct StatsArgs {
    /// Point CSV with an `X,Y` or `X,Y,Z` header.
    csv_path: PathBuf,

    /// Print statistics as JSON.
    #[arg(long)]
    json: bool,

    /// Also write each point with its distance to the next one.
    #[arg(long)]
    distances: Option<PathBuf>,
}

/// Curve sampling selection.
#[derive(Clone, Copy, ValueEnum)]
enum Sampling {
    /// Equal steps of the ellipse angle.
    UniformAngle,
    /// Equal distances along the curve.
    ArcLength,
}

impl From<Sampling> for SamplingKind {
    fn from(sampling: Sampling) -> Self {
        match sampling {
            Sampling::UniformAngle => Self::UniformAngle,
            Sampling::ArcLength => Self::ArcLength,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn parameters(a: f64, b: f64, what: &str) -> Result<CurveParameters, String> {
    CurveParameters::new(a, b).map_err(|e| format!("Invalid {what}: {e}"))
}

/// Apply the shared flags to a config built from the subcommand flags,
/// then any `--config-json` overrides.
fn with_generate_args(config: SpiralConfig, args: &GenerateArgs) -> Result<SpiralConfig, String> {
    let resolution = match (args.count, args.spacing) {
        (Some(count), _) => Resolution::Count(count),
        (None, Some(spacing)) => Resolution::Spacing(spacing),
        (None, None) => Resolution::Auto,
    };

    let flagged = SpiralConfig {
        sampling: args.sampling.into(),
        resolution,
        export_seed: args.export_seed,
        max_iterations: args.max_iterations,
        ..config
    };

    match args.config_json {
        Some(ref json) => merge_config_json(flagged, json),
        None => Ok(flagged),
    }
}

/// Overlay the fields of the JSON object `json` on `base`.
fn merge_config_json(base: SpiralConfig, json: &str) -> Result<SpiralConfig, String> {
    let overrides: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?;
    let serde_json::Value::Object(overrides) = overrides else {
        return Err("Error parsing --config-json: expected a JSON object".to_owned());
    };
    let serde_json::Value::Object(mut merged) = serde_json::to_value(&base)
        .map_err(|e| format!("Error serializing config: {e}"))?
    else {
        return Err("Error serializing config: not a JSON object".to_owned());
    };
    merged.extend(overrides);

    let config: SpiralConfig = serde_json::from_value(serde_json::Value::Object(merged))
        .map_err(|e| format!("Error parsing --config-json: {e}"))?;
    if config.direction != base.direction {
        return Err(format!(
            "--config-json direction {:?} does not match the {:?} subcommand",
            config.direction, base.direction,
        ));
    }
    Ok(config)
}

fn grow_config(args: &GrowArgs) -> Result<SpiralConfig, String> {
    let seed = parameters(args.a, args.b, "seed")?;
    let bound = match (args.bound_a, args.bound_b) {
        (Some(a), Some(b)) => parameters(a, b, "bound")?,
        _ => parameters(
            args.a * args.bound_scale,
            args.b * args.bound_scale,
            "bound",
        )?,
    };
    with_generate_args(SpiralConfig::outward(seed, args.step, bound), &args.generate)
}

fn shrink_config(args: &ShrinkArgs) -> Result<SpiralConfig, String> {
    let seed = parameters(args.a, args.b, "seed")?;
    with_generate_args(SpiralConfig::inward(seed, args.step), &args.generate)
}

/// Generate the spiral for `config` and write every requested output.
fn run_generate(config: &SpiralConfig, args: &GenerateArgs) -> Result<(), String> {
    let path = scarf_spiral::generate(config).map_err(|e| format!("Generation error: {e}"))?;
    let summary = path.summary();

    let y_offset = args.y_offset_percent * config.step / 100.0;
    let points = Curve::new(path.to_points()).translated(0.0, y_offset);

    if args.json {
        let json = serde_json::to_string_pretty(summary)
            .map_err(|e| format!("Error serializing summary: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", summary_report(summary));
        println!("{}", PathStats::from_points(points.points()).report());
    }

    if let Some(ref csv_path) = args.csv {
        let options = CsvOptions {
            layout: args.z.map_or(CsvLayout::Xy, |z| CsvLayout::Xyz { z }),
            stride: args.stride,
        };
        let file = create(csv_path)?;
        let rows = scarf_export::write_csv(BufWriter::new(file), points.points(), &options)
            .map_err(|e| format!("Error writing CSV to {}: {e}", csv_path.display()))?;
        log::info!("CSV written to {} ({rows} points)", csv_path.display());
    }

    if let Some(ref svg_path) = args.svg {
        let outline = match config.termination {
            Termination::BoundaryIntersection { bound } => Some(
                config
                    .sampling
                    .sample(bound, summary.sample_count)
                    .map_err(|e| format!("Error sampling boundary: {e}"))?
                    .translated(0.0, y_offset),
            ),
            Termination::AxisDegenerate => None,
        };
        let description = format!(
            "{:?} from {} by {} ({} curves, {} points)",
            config.direction, config.seed, config.step, summary.curves, summary.points,
        );
        let config_json = serde_json::to_string(config)
            .map_err(|e| format!("Error serializing config: {e}"))?;
        let metadata = SvgMetadata {
            title: svg_path.file_stem().and_then(|s| s.to_str()),
            description: Some(&description),
            config_json: Some(&config_json),
            outline: outline.as_ref().map(Curve::points),
        };
        let svg = scarf_export::to_svg(points.points(), &metadata);
        std::fs::write(svg_path, &svg)
            .map_err(|e| format!("Error writing SVG to {}: {e}", svg_path.display()))?;
        log::info!("SVG written to {} ({} bytes)", svg_path.display(), svg.len());
    }

    Ok(())
}

fn run_stats(args: &StatsArgs) -> Result<(), String> {
    let file = File::open(&args.csv_path)
        .map_err(|e| format!("Error reading {}: {e}", args.csv_path.display()))?;
    let table = scarf_export::read_csv_table(BufReader::new(file))
        .map_err(|e| format!("Error parsing {}: {e}", args.csv_path.display()))?;
    let stats = match table {
        CsvTable::Xy(ref points) => PathStats::from_points(points),
        CsvTable::Xyz(ref points) => PathStats::from_points(points),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&stats)
            .map_err(|e| format!("Error serializing stats: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", stats.report());
    }

    if let Some(ref distances_path) = args.distances {
        let file = create(distances_path)?;
        let out = BufWriter::new(file);
        match table {
            CsvTable::Xy(ref points) => scarf_export::write_distances_csv(out, points),
            CsvTable::Xyz(ref points) => scarf_export::write_distances_csv_3d(out, points),
        }
        .map_err(|e| format!("Error writing {}: {e}", distances_path.display()))?;
        log::info!("Distances written to {}", distances_path.display());
    }

    Ok(())
}

fn create(path: &Path) -> Result<File, String> {
    File::create(path).map_err(|e| format!("Error creating {}: {e}", path.display()))
}

fn summary_report(summary: &RunSummary) -> String {
    format!(
        "Termination: {:?}\nIterations: {}\nCurves: {} ({} samples each)\nSegments: {}\nFinal curve: {}",
        summary.termination,
        summary.iterations,
        summary.curves,
        summary.sample_count,
        summary.segments,
        summary.final_parameters,
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Grow(args) => grow_config(args).and_then(|c| run_generate(&c, &args.generate)),
        Command::Shrink(args) => {
            shrink_config(args).and_then(|c| run_generate(&c, &args.generate))
        }
        Command::Stats(args) => run_stats(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
