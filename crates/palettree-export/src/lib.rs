//! palettree-export: Pure format serializers (sans-IO)
//!
//! Converts distinct colors and their MST into output formats: CSV edge
//! lists, Graphviz DOT graphs, and JSON. Every serializer returns a
//! `String`; writing it anywhere is the caller's job.

pub mod csv;
pub mod dot;
pub mod json;

pub use csv::to_csv;
pub use dot::{DotMetadata, to_dot};
pub use json::to_json;

/// Errors produced while serializing pipeline output.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// An edge refers to a vertex with no color.
    #[error("edge endpoint {index} is out of range for {len} colors")]
    VertexOutOfRange {
        /// The offending vertex index.
        index: usize,
        /// Number of colors available.
        len: usize,
    },

    /// JSON serialization failed.
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Look up the colors of both endpoints of an edge.
pub(crate) fn endpoints(
    colors: &[palettree_pipeline::Color],
    edge: &palettree_pipeline::MstEdge,
) -> Result<(palettree_pipeline::Color, palettree_pipeline::Color), ExportError> {
    let lookup = |index: usize| {
        colors.get(index).copied().ok_or(ExportError::VertexOutOfRange {
            index,
            len: colors.len(),
        })
    };
    Ok((lookup(edge.from)?, lookup(edge.to)?))
}
