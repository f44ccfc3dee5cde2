use clap::Parser;
use dpmatch::io::{load_rgb_image, save_rgb_image};
use dpmatch::lowlevel::host_parallelism;
use dpmatch::{DpReport, FusionConfig, FusionMatcher, StereoConfig, StereoMatcher};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "DpMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for per-pass timing.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum Mode {
    #[default]
    Stereo,
    Fusion,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StereoConfigJson {
    max_disparity: usize,
    weight: f64,
    row_width: usize,
    edge_threshold: u8,
    skip: usize,
}

impl Default for StereoConfigJson {
    fn default() -> Self {
        let cfg = StereoConfig::default();
        Self {
            max_disparity: cfg.max_disparity,
            weight: cfg.weight,
            row_width: cfg.row_width,
            edge_threshold: cfg.edge_threshold,
            skip: cfg.skip,
        }
    }
}

impl From<&StereoConfigJson> for StereoConfig {
    fn from(value: &StereoConfigJson) -> Self {
        Self {
            max_disparity: value.max_disparity,
            weight: value.weight,
            row_width: value.row_width,
            edge_threshold: value.edge_threshold,
            skip: value.skip,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FusionConfigJson {
    sigma_c: f64,
    sigma_g: f64,
    skip: usize,
}

impl Default for FusionConfigJson {
    fn default() -> Self {
        let cfg = FusionConfig::default();
        Self {
            sigma_c: cfg.sigma_c,
            sigma_g: cfg.sigma_g,
            skip: cfg.skip,
        }
    }
}

impl From<&FusionConfigJson> for FusionConfig {
    fn from(value: &FusionConfigJson) -> Self {
        Self {
            sigma_c: value.sigma_c,
            sigma_g: value.sigma_g,
            skip: value.skip,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    mode: Mode,
    primary_path: String,
    reference_path: String,
    output_path: String,
    summary_path: Option<String>,
    workers: Option<usize>,
    interpolation_threshold: i32,
    stereo: StereoConfigJson,
    fusion: FusionConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Stereo,
            primary_path: String::new(),
            reference_path: String::new(),
            output_path: String::new(),
            summary_path: None,
            workers: None,
            interpolation_threshold: 5,
            stereo: StereoConfigJson::default(),
            fusion: FusionConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportRecord {
    full_solves: usize,
    partial_solves: usize,
    interpolated_pixels: usize,
    passes: usize,
    recovered_backtraces: usize,
}

impl From<DpReport> for ReportRecord {
    fn from(value: DpReport) -> Self {
        Self {
            full_solves: value.full_solves,
            partial_solves: value.partial_solves,
            interpolated_pixels: value.interpolated_pixels,
            passes: value.passes,
            recovered_backtraces: value.recovered_backtraces,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    mode: Mode,
    width: usize,
    height: usize,
    workers: usize,
    elapsed_ms: f64,
    output_path: String,
    report: ReportRecord,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("dpmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.primary_path.is_empty()
        || config.reference_path.is_empty()
        || config.output_path.is_empty()
    {
        return Err("primary_path, reference_path and output_path must be set in the config".into());
    }
    let workers = config.workers.unwrap_or_else(host_parallelism);
    if workers == 0 {
        return Err("workers must be at least 1".into());
    }

    let primary = load_rgb_image(&config.primary_path)?;
    let reference = load_rgb_image(&config.reference_path)?;
    let (width, height) = (primary.width(), primary.height());

    let start = Instant::now();
    let (report, rendered) = match config.mode {
        Mode::Stereo => {
            let mut matcher =
                StereoMatcher::new(primary, reference, (&config.stereo).into(), workers)?;
            matcher
                .engine_mut()
                .set_interpolation_threshold(config.interpolation_threshold);
            let report = matcher.run()?;
            (report, matcher.disparity_image()?)
        }
        Mode::Fusion => {
            let mut matcher =
                FusionMatcher::new(primary, reference, (&config.fusion).into(), workers)?;
            matcher
                .engine_mut()
                .set_interpolation_threshold(config.interpolation_threshold);
            let report = matcher.run()?;
            (report, matcher.fused_image()?)
        }
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    tracing::info!(elapsed_ms, "matching finished");

    save_rgb_image(&config.output_path, &rendered)?;

    let output = Output {
        mode: config.mode,
        width,
        height,
        workers,
        elapsed_ms,
        output_path: config.output_path.clone(),
        report: report.into(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.summary_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
