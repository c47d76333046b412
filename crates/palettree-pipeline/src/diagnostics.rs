//! Pipeline diagnostics: timing, counts, and tree statistics per stage.
//!
//! This is the reporting side channel of the pipeline. The computation
//! never prints or shows anything; callers that want the distinct-color
//! count or the total MST cost read them from [`PipelineDiagnostics`]
//! (or straight from the [`ProcessResult`]).
//!
//! Timestamps come from an injected [`Clock`] so tests can supply a
//! deterministic one. [`SystemClock`] uses the `web-time` crate, which
//! is `performance.now()` on WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mst::MstStrategy;
use crate::types::{
    Dimensions, MstResult, PipelineConfig, PipelineError, PixelBuffer, ProcessResult,
};
use crate::{blur, decode, distinct};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`web_time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = web_time::Instant;

    fn now(&self) -> web_time::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &web_time::Instant) -> Duration {
        since.elapsed()
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
///
/// Stages that are conditionally skipped have `Option` fields that are
/// `None` when the stage did not run: `decode` when the caller supplied
/// a pixel buffer directly, `blur` when `blur_sigma == 0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Image decoding.
    pub decode: Option<StageDiagnostics>,
    /// Gaussian pre-smoothing.
    pub blur: Option<StageDiagnostics>,
    /// Distinct-color extraction.
    pub extraction: StageDiagnostics,
    /// MST construction.
    pub mst: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: usize,
        /// Decoded image height in pixels.
        height: usize,
    },
    /// Gaussian pre-smoothing metrics.
    Blur {
        /// Sigma value used for the blur kernel.
        sigma: f32,
    },
    /// Distinct-color extraction metrics.
    Extraction {
        /// Pixels scanned.
        pixel_count: usize,
        /// Distinct colors found.
        distinct_count: usize,
        /// Fraction of pixels that repeated an earlier color.
        duplicate_ratio: f64,
    },
    /// MST construction metrics.
    Mst {
        /// Which strategy built the tree.
        strategy: String,
        /// Vertices spanned.
        vertex_count: usize,
        /// Edges produced.
        edge_count: usize,
        /// Sum of edge weights.
        total_weight: f64,
        /// Mean edge weight (0 for an empty tree).
        mean_edge_weight: f64,
        /// Heaviest edge (0 for an empty tree).
        max_edge_weight: f64,
    },
}

/// High-level summary for the entire run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: usize,
    /// Source image height in pixels.
    pub image_height: usize,
    /// Total pixel count.
    pub pixel_count: usize,
    /// Number of distinct colors.
    pub distinct_colors: usize,
    /// Total weight of the minimum spanning tree.
    pub mst_total_weight: f64,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages: Vec<(&str, &StageDiagnostics)> = Vec::new();
        if let Some(ref d) = self.decode {
            stages.push(("Decode", d));
        }
        if let Some(ref b) = self.blur {
            stages.push(("Blur", b));
        }
        stages.push(("Distinct Colors", &self.extraction));
        stages.push(("MST", &self.mst));

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Distinct colors: {}  |  MST total cost: {:.6}",
            self.summary.distinct_colors, self.summary.mst_total_weight,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Blur { sigma } => format!("sigma={sigma:.2}"),
        StageMetrics::Extraction {
            pixel_count,
            distinct_count,
            duplicate_ratio,
        } => format!(
            "{pixel_count} px -> {distinct_count} colors ({:.1}% repeats)",
            duplicate_ratio * 100.0,
        ),
        StageMetrics::Mst {
            strategy,
            vertex_count,
            edge_count,
            total_weight,
            mean_edge_weight,
            max_edge_weight,
        } => format!(
            "{strategy} {vertex_count} vertices, {edge_count} edges, cost={total_weight:.3} (mean={mean_edge_weight:.3} max={max_edge_weight:.3})",
        ),
    }
}

#[allow(clippy::cast_precision_loss)]
fn extraction_metrics(pixel_count: usize, distinct_count: usize) -> StageMetrics {
    let duplicate_ratio = if pixel_count > 0 {
        1.0 - distinct_count as f64 / pixel_count as f64
    } else {
        0.0
    };
    StageMetrics::Extraction {
        pixel_count,
        distinct_count,
        duplicate_ratio,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mst_metrics(strategy: MstStrategy, vertex_count: usize, mst: &MstResult) -> StageMetrics {
    let edge_count = mst.edge_count();
    let mean_edge_weight = if edge_count > 0 {
        mst.total_weight() / edge_count as f64
    } else {
        0.0
    };
    let max_edge_weight = mst
        .edges()
        .iter()
        .map(|e| e.weight)
        .fold(0.0, f64::max);
    StageMetrics::Mst {
        strategy: format!("{strategy:?}"),
        vertex_count,
        edge_count,
        total_weight: mst.total_weight(),
        mean_edge_weight,
        max_edge_weight,
    }
}

/// Decode image bytes and run the pipeline, collecting diagnostics.
///
/// # Errors
///
/// Same as [`crate::process`].
pub fn process_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(ProcessResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let start = clock.now();

    let t = clock.now();
    let image = decode::decode_rgb(image_bytes)?;
    let dims = Dimensions::of(&image);
    let decode = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: dims.width,
            height: dims.height,
        },
    };

    let (result, mut diagnostics) = run_stages(&image, config, clock)?;
    diagnostics.decode = Some(decode);
    diagnostics.total_duration = clock.elapsed(&start);
    Ok((result, diagnostics))
}

/// Run the pipeline on a pixel buffer, collecting diagnostics.
///
/// # Errors
///
/// Same as [`crate::process_buffer`].
pub fn process_buffer_with_diagnostics<B: PixelBuffer + ?Sized, C: Clock>(
    buffer: &B,
    config: &PipelineConfig,
    clock: &C,
) -> Result<(ProcessResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let start = clock.now();
    let (result, mut diagnostics) = run_stages(buffer, config, clock)?;
    diagnostics.total_duration = clock.elapsed(&start);
    Ok((result, diagnostics))
}

/// Blur (optional), extraction and MST stages shared by both entry points.
///
/// `decode` is left `None` and `total_duration` covers only these stages;
/// callers fill both in.
fn run_stages<B: PixelBuffer + ?Sized, C: Clock>(
    buffer: &B,
    config: &PipelineConfig,
    clock: &C,
) -> Result<(ProcessResult, PipelineDiagnostics), PipelineError> {
    let start = clock.now();
    buffer.check_shape()?;
    let dimensions = Dimensions::of(buffer);
    let pixel_count = dimensions.pixel_count();

    let (colors, blur, extraction) = if config.blur_sigma > 0.0 {
        let t = clock.now();
        let smoothed = blur::smooth_buffer(buffer, config.blur_sigma)?;
        let blur = StageDiagnostics {
            duration: clock.elapsed(&t),
            metrics: StageMetrics::Blur {
                sigma: config.blur_sigma,
            },
        };

        let t = clock.now();
        let colors = distinct::extract_distinct_colors(&smoothed)?;
        let extraction = StageDiagnostics {
            duration: clock.elapsed(&t),
            metrics: extraction_metrics(pixel_count, colors.len()),
        };
        (colors, Some(blur), extraction)
    } else {
        let t = clock.now();
        let colors = distinct::extract_distinct_colors(buffer)?;
        let extraction = StageDiagnostics {
            duration: clock.elapsed(&t),
            metrics: extraction_metrics(pixel_count, colors.len()),
        };
        (colors, None, extraction)
    };

    let t = clock.now();
    let mst = config.mst_strategy.build_checked(colors.as_slice())?;
    let mst_stage = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: mst_metrics(config.mst_strategy, colors.len(), &mst),
    };

    let summary = PipelineSummary {
        image_width: dimensions.width,
        image_height: dimensions.height,
        pixel_count,
        distinct_colors: colors.len(),
        mst_total_weight: mst.total_weight(),
    };

    let diagnostics = PipelineDiagnostics {
        decode: None,
        blur,
        extraction,
        mst: mst_stage,
        total_duration: clock.elapsed(&start),
        summary,
    };

    Ok((
        ProcessResult {
            colors,
            mst,
            dimensions,
        },
        diagnostics,
    ))
}
