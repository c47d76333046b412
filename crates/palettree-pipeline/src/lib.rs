//! palettree-pipeline: distinct-color extraction and color-space MST (sans-IO).
//!
//! Turns an image into the graph a color quantizer clusters on:
//! decode -> optional blur -> distinct colors -> minimum spanning tree.
//!
//! The distinct colors of the image, in first-occurrence row-major order,
//! are the vertices. Every pair of vertices is joined by an edge weighted
//! by Euclidean RGB distance, and the pipeline returns a minimum spanning
//! tree of that complete graph.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory byte
//! slices or pixel buffers and returns structured data. Reading files and
//! printing reports lives in `palettree-bench`.

pub mod blur;
pub mod decode;
pub mod diagnostics;
pub mod distinct;
pub mod mst;
pub mod types;
pub mod verify;

pub use distinct::{COLOR_DOMAIN, PresenceTable, extract_distinct_colors};
pub use mst::{MstBuilder, MstStrategy};
pub use types::{
    Color, Dimensions, DistinctColors, MstEdge, MstResult, PipelineConfig, PipelineError,
    PixelBuffer, PixelGrid, ProcessResult, RgbImage, RgbaImage,
};

/// Run the full pipeline on encoded image bytes.
///
/// # Pipeline steps
///
/// 1. Decode image to 8-bit RGB
/// 2. Optional Gaussian pre-smoothing (`blur_sigma > 0`)
/// 3. Distinct-color extraction
/// 4. MST construction with the configured strategy
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the config is invalid or
/// the color count exceeds the strategy's limit.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    config.validate()?;
    let image = decode::decode_rgb(image_bytes)?;
    process_buffer(&image, config)
}

/// Run the pipeline on an already-decoded pixel buffer.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the config is invalid or
/// the color count exceeds the strategy's limit.
/// Returns [`PipelineError::InvalidBuffer`] if the buffer is not
/// rectangular.
pub fn process_buffer<B: PixelBuffer + ?Sized>(
    buffer: &B,
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    config.validate()?;
    buffer.check_shape()?;
    let dimensions = Dimensions::of(buffer);

    let colors = if config.blur_sigma > 0.0 {
        let smoothed = blur::smooth_buffer(buffer, config.blur_sigma)?;
        extract_distinct_colors(&smoothed)?
    } else {
        extract_distinct_colors(buffer)?
    };

    let mst = config.mst_strategy.build_checked(colors.as_slice())?;

    Ok(ProcessResult {
        colors,
        mst,
        dimensions,
    })
}
