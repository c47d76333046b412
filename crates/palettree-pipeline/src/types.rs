//! Shared types for the palettree pipeline.

use serde::{Deserialize, Serialize};

use crate::mst::MstStrategy;

/// Re-export `RgbImage` so downstream crates can hand decoded images to
/// the pipeline without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `RgbaImage`; the alpha channel is ignored when it is read as
/// a [`PixelBuffer`].
pub use image::RgbaImage;

/// An 8-bit-per-channel RGB color.
///
/// Colors are plain values: two colors are equal exactly when all three
/// channels are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Color {
    /// Create a new color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// The packed 24-bit `0xRRGGBB` value of this color.
    #[must_use]
    pub const fn key(self) -> u32 {
        ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }

    /// Squared Euclidean distance to another color in RGB space.
    ///
    /// Exact in integer arithmetic; the maximum is `3 * 255^2`.
    #[must_use]
    pub const fn distance_squared(self, other: Self) -> u32 {
        let dr = self.red.abs_diff(other.red) as u32;
        let dg = self.green.abs_diff(other.green) as u32;
        let db = self.blue.abs_diff(other.blue) as u32;
        dr * dr + dg * dg + db * db
    }

    /// Euclidean distance to another color in RGB space.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        f64::from(self.distance_squared(other)).sqrt()
    }

    /// Lowercase `#rrggbb` representation.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.key())
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(p: image::Rgb<u8>) -> Self {
        let [red, green, blue] = p.0;
        Self { red, green, blue }
    }
}

impl From<image::Rgba<u8>> for Color {
    fn from(p: image::Rgba<u8>) -> Self {
        let [red, green, blue, _] = p.0;
        Self { red, green, blue }
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(c: Color) -> Self {
        Self([c.red, c.green, c.blue])
    }
}

/// A read-only, row-major grid of colors.
///
/// This is the boundary between image acquisition and the pipeline.
/// Rows run top to bottom and columns left to right.
pub trait PixelBuffer {
    /// Number of rows.
    fn height(&self) -> usize;

    /// Number of columns.
    fn width(&self) -> usize;

    /// The color at `(row, col)`.
    ///
    /// Callers stay within `row < height()` and `col < width()`.
    fn pixel(&self, row: usize, col: usize) -> Color;

    /// Reject buffers whose rows do not all have `width()` columns.
    ///
    /// Buffers that are rectangular by construction keep the default.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidBuffer`] for a ragged buffer.
    fn check_shape(&self) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// An owned, rectangular pixel grid.
///
/// Deserialization goes through [`PixelGrid::new`], so a grid whose pixel
/// count disagrees with its dimensions never exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PixelGridData")]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

/// Unchecked wire form of [`PixelGrid`].
#[derive(Deserialize)]
struct PixelGridData {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl TryFrom<PixelGridData> for PixelGrid {
    type Error = PipelineError;

    fn try_from(data: PixelGridData) -> Result<Self, Self::Error> {
        Self::new(data.width, data.height, data.pixels)
    }
}

impl PixelGrid {
    /// Create a grid from row-major pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidBuffer`] if `pixels.len()` is not
    /// `width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self, PipelineError> {
        let expected = width.checked_mul(height).ok_or_else(|| {
            PipelineError::InvalidBuffer(format!("{width}x{height} overflows the pixel count"))
        })?;
        if pixels.len() != expected {
            return Err(PipelineError::InvalidBuffer(format!(
                "expected {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a grid from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidBuffer`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<Color>>) -> Result<Self, PipelineError> {
        rows.as_slice().check_shape()?;
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let pixels = rows.into_iter().flatten().collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Row-major slice of all pixels.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
}

impl PixelBuffer for PixelGrid {
    fn height(&self) -> usize {
        self.height
    }

    fn width(&self) -> usize {
        self.width
    }

    fn pixel(&self, row: usize, col: usize) -> Color {
        self.pixels[row * self.width + col]
    }
}

/// A jagged row list, as a caller might assemble one by hand.
///
/// The width is taken from the first row; [`PixelBuffer::check_shape`]
/// rejects the buffer if any other row differs.
impl PixelBuffer for [Vec<Color>] {
    fn height(&self) -> usize {
        self.len()
    }

    fn width(&self) -> usize {
        self.first().map_or(0, Vec::len)
    }

    fn pixel(&self, row: usize, col: usize) -> Color {
        self[row][col]
    }

    fn check_shape(&self) -> Result<(), PipelineError> {
        let width = self.width();
        match self.iter().position(|row| row.len() != width) {
            Some(row) => Err(PipelineError::InvalidBuffer(format!(
                "row {row} has {} columns, expected {width}",
                self[row].len()
            ))),
            None => Ok(()),
        }
    }
}

impl PixelBuffer for RgbImage {
    fn height(&self) -> usize {
        self.dimensions().1 as usize
    }

    fn width(&self) -> usize {
        self.dimensions().0 as usize
    }

    #[allow(clippy::cast_possible_truncation)]
    fn pixel(&self, row: usize, col: usize) -> Color {
        // Image dimensions are u32, so in-range indices fit.
        Color::from(*self.get_pixel(col as u32, row as u32))
    }
}

impl PixelBuffer for RgbaImage {
    fn height(&self) -> usize {
        self.dimensions().1 as usize
    }

    fn width(&self) -> usize {
        self.dimensions().0 as usize
    }

    #[allow(clippy::cast_possible_truncation)]
    fn pixel(&self, row: usize, col: usize) -> Color {
        Color::from(*self.get_pixel(col as u32, row as u32))
    }
}

/// The distinct colors of a pixel buffer, in first-occurrence order.
///
/// The position of a color in this set is its vertex index in the MST.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DistinctColors(Vec<Color>);

impl DistinctColors {
    /// Wrap colors that are already known to be unique.
    pub(crate) const fn from_unique(colors: Vec<Color>) -> Self {
        Self(colors)
    }

    /// Number of distinct colors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the source buffer had no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The colors, indexed by vertex.
    #[must_use]
    pub fn as_slice(&self) -> &[Color] {
        &self.0
    }

    /// Iterate over the colors in vertex order.
    pub fn iter(&self) -> std::slice::Iter<'_, Color> {
        self.0.iter()
    }

    /// Consumes the set and returns the underlying vector.
    #[must_use]
    pub fn into_colors(self) -> Vec<Color> {
        self.0
    }
}

impl<'a> IntoIterator for &'a DistinctColors {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One edge of a minimum spanning tree over color vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MstEdge {
    /// Tree neighbor (parent) of `to`.
    pub from: usize,
    /// Vertex joined to the tree by this edge.
    pub to: usize,
    /// Euclidean distance between the two colors.
    pub weight: f64,
}

impl MstEdge {
    /// Create a new edge.
    #[must_use]
    pub const fn new(from: usize, to: usize, weight: f64) -> Self {
        Self { from, to, weight }
    }
}

/// A minimum spanning tree: edges in inclusion order plus their total weight.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MstResult {
    edges: Vec<MstEdge>,
    total_weight: f64,
}

impl MstResult {
    /// The tree of zero or one vertex.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            edges: Vec::new(),
            total_weight: 0.0,
        }
    }

    /// Assemble a result from edges and the weight accumulated while
    /// producing them.
    pub(crate) const fn from_parts(edges: Vec<MstEdge>, total_weight: f64) -> Self {
        Self {
            edges,
            total_weight,
        }
    }

    /// Edges in the order they joined the tree.
    #[must_use]
    pub fn edges(&self) -> &[MstEdge] {
        &self.edges
    }

    /// Sum of all edge weights.
    #[must_use]
    pub const fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Number of edges.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the tree has no edges.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Consumes the result and returns the edges.
    #[must_use]
    pub fn into_edges(self) -> Vec<MstEdge> {
        self.edges
    }
}

/// Buffer dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Dimensions {
    /// Dimensions of a pixel buffer.
    #[must_use]
    pub fn of<B: PixelBuffer + ?Sized>(buffer: &B) -> Self {
        Self {
            width: buffer.width(),
            height: buffer.height(),
        }
    }

    /// Total pixel count (`width * height`), saturating.
    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.width.saturating_mul(self.height)
    }
}

/// Configuration for the pipeline.
///
/// Defaults extract colors from the unmodified image and build the tree
/// with [`MstStrategy::DensePrim`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gaussian pre-smoothing sigma applied before color extraction.
    /// `0.0` disables smoothing.
    pub blur_sigma: f32,

    /// Which MST construction algorithm to use.
    pub mst_strategy: MstStrategy,
}

impl PipelineConfig {
    /// Default pre-smoothing sigma (disabled).
    pub const DEFAULT_BLUR_SIGMA: f32 = 0.0;

    /// Default MST construction algorithm.
    pub const DEFAULT_MST_STRATEGY: MstStrategy = MstStrategy::DensePrim;

    /// Largest accepted pre-smoothing sigma.
    ///
    /// The Gaussian kernel spans `4 * sigma + 1` taps per pass, so larger
    /// values only cost time without changing a realistically sized image.
    pub const MAX_BLUR_SIGMA: f32 = 100.0;

    /// Check the configuration for values the pipeline cannot honor.
    ///
    /// Vertex-count limits of a strategy depend on the image and are
    /// checked when the tree is built.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `blur_sigma` is
    /// negative, not finite, or above [`Self::MAX_BLUR_SIGMA`].
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_sigma must be finite and non-negative, got {}",
                self.blur_sigma
            )));
        }
        if self.blur_sigma > Self::MAX_BLUR_SIGMA {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_sigma must be at most {}, got {}",
                Self::MAX_BLUR_SIGMA,
                self.blur_sigma
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_sigma: Self::DEFAULT_BLUR_SIGMA,
            mst_strategy: Self::DEFAULT_MST_STRATEGY,
        }
    }
}

/// Output of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Distinct colors of the (optionally smoothed) image.
    pub colors: DistinctColors,

    /// Minimum spanning tree over `colors`.
    pub mst: MstResult,

    /// Dimensions of the source buffer.
    pub dimensions: Dimensions,
}

/// Errors that can occur during pipeline processing.
///
/// Uses custom `Serialize`/`Deserialize` because `image::ImageError`
/// does not implement serde traits. The `ImageDecode` variant is
/// serialized as its `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The pixel buffer is not a well-formed rectangle.
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

/// Serde-compatible proxy for `PipelineError`.
#[derive(Serialize, Deserialize)]
enum PipelineErrorProxy {
    InvalidBuffer(String),
    EmptyInput,
    ImageDecode(String),
    InvalidConfig(String),
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::InvalidBuffer(s) => PipelineErrorProxy::InvalidBuffer(s.clone()),
            Self::EmptyInput => PipelineErrorProxy::EmptyInput,
            Self::ImageDecode(e) => PipelineErrorProxy::ImageDecode(e.to_string()),
            Self::InvalidConfig(s) => PipelineErrorProxy::InvalidConfig(s.clone()),
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PipelineError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = PipelineErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            PipelineErrorProxy::InvalidBuffer(s) => Self::InvalidBuffer(s),
            PipelineErrorProxy::EmptyInput => Self::EmptyInput,
            PipelineErrorProxy::ImageDecode(msg) => {
                // The typed decode error cannot be rebuilt; keep the message.
                Self::ImageDecode(image::ImageError::IoError(std::io::Error::other(msg)))
            }
            PipelineErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
        })
    }
}
