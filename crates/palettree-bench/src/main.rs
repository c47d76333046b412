//! palettree-bench: CLI tool for distinct-color extraction and MST diagnostics.
//!
//! Runs the pipeline on a given image file with configurable parameters,
//! printing the distinct-color count, the total MST cost and per-stage
//! timings. Useful for:
//!
//! - Comparing MST strategies (`dense-prim` vs `heap-prim` vs `kruskal`)
//! - Measuring how pre-smoothing shrinks the color set
//! - Exporting the tree as CSV or Graphviz DOT for inspection
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin palettree-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use palettree_pipeline::diagnostics::{PipelineDiagnostics, SystemClock};
use palettree_pipeline::{MstStrategy, PipelineConfig, ProcessResult};

/// Distinct-color extraction and color-space MST diagnostics.
///
/// Decodes an image, extracts its distinct colors, builds a minimum
/// spanning tree over them and prints per-stage timing and counts.
#[derive(Parser)]
#[command(name = "palettree-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Gaussian pre-smoothing sigma (0 disables, at most 100).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// MST construction strategy.
    #[arg(long, value_enum, default_value_t = Strategy::DensePrim)]
    strategy: Strategy,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Write the MST edge list as CSV to this file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the MST as a Graphviz DOT graph to this file.
    #[arg(long)]
    dot: Option<PathBuf>,
}

/// MST strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Heap-free O(n^2) Prim with lowest-index tie-break.
    DensePrim,
    /// Binary-heap Prim.
    HeapPrim,
    /// Kruskal over all pairs (small color sets only).
    Kruskal,
}

impl From<Strategy> for MstStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::DensePrim => Self::DensePrim,
            Strategy::HeapPrim => Self::HeapPrim,
            Strategy::Kruskal => Self::Kruskal,
        }
    }
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PipelineConfig {
        blur_sigma: cli.blur_sigma,
        mst_strategy: cli.strategy.into(),
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match palettree_pipeline::diagnostics::process_with_diagnostics(
            &image_bytes,
            &config,
            &SystemClock,
        ) {
            Ok((result, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Write exports on the first run only.
                if run == 0 {
                    write_exports(&cli, &config, &result);
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Write the requested CSV and DOT files, reporting failures on stderr.
fn write_exports(cli: &Cli, config: &PipelineConfig, result: &ProcessResult) {
    let colors = result.colors.as_slice();

    if let Some(ref csv_path) = cli.csv {
        match palettree_export::to_csv(colors, &result.mst) {
            Ok(csv) => write_file(csv_path, &csv, "CSV"),
            Err(e) => eprintln!("Error building CSV: {e}"),
        }
    }

    if let Some(ref dot_path) = cli.dot {
        let title = cli
            .image_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let desc = format!("{config:?}");
        let metadata = palettree_export::DotMetadata {
            title: Some(title),
            description: Some(&desc),
        };
        match palettree_export::to_dot(colors, &result.mst, &metadata) {
            Ok(dot) => write_file(dot_path, &dot, "DOT"),
            Err(e) => eprintln!("Error building DOT: {e}"),
        }
    }
}

fn write_file(path: &Path, contents: &str, kind: &str) {
    match std::fs::write(path, contents) {
        Ok(()) => eprintln!(
            "{kind} written to {} ({} bytes)",
            path.display(),
            contents.len()
        ),
        Err(e) => eprintln!("Error writing {kind} to {}: {e}", path.display()),
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&PipelineDiagnostics) -> Option<std::time::Duration>;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Decode", |d| d.decode.as_ref().map(|s| s.duration)),
        ("Blur", |d| d.blur.as_ref().map(|s| s.duration)),
        ("Distinct Colors", |d| Some(d.extraction.duration)),
        ("MST", |d| Some(d.mst.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["palettree-bench", "photo.png"]).unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(cli.runs, 1);
    }

    #[test]
    fn cli_flags_build_config() {
        let cli = Cli::try_parse_from([
            "palettree-bench",
            "photo.png",
            "--blur-sigma",
            "1.5",
            "--strategy",
            "heap-prim",
        ])
        .unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert!((config.blur_sigma - 1.5).abs() < f32::EPSILON);
        assert_eq!(config.mst_strategy, MstStrategy::HeapPrim);
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = Cli::try_parse_from([
            "palettree-bench",
            "photo.png",
            "--strategy",
            "heap-prim",
            "--config-json",
            r#"{"mst_strategy":"Kruskal"}"#,
        ])
        .unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.mst_strategy, MstStrategy::Kruskal);
    }

    #[test]
    fn bad_config_json_is_reported() {
        let cli =
            Cli::try_parse_from(["palettree-bench", "photo.png", "--config-json", "{"]).unwrap();
        assert!(config_from_cli(&cli).is_err());
    }

    #[test]
    fn oversized_blur_sigma_fails_validation() {
        let cli =
            Cli::try_parse_from(["palettree-bench", "photo.png", "--blur-sigma", "1e30"]).unwrap();
        let config = config_from_cli(&cli).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_runs_rejected() {
        assert!(Cli::try_parse_from(["palettree-bench", "photo.png", "--runs", "0"]).is_err());
    }
}
