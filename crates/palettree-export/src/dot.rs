//! Graphviz DOT export.
//!
//! Emits the MST as an undirected `graph`. Each distinct color becomes a
//! node filled with that color and labelled with its hex value; each MST
//! edge is labelled with its weight. Render with e.g.
//! `neato -Tsvg palette.dot > palette.svg`.
//!
//! Nodes are emitted for every color, including an isolated single color,
//! so the rendered graph always shows the full palette.

use std::fmt::Write;

use palettree_pipeline::{Color, MstResult};

use crate::{ExportError, endpoints};

/// Metadata to embed as `//` comment lines at the top of the DOT file.
#[derive(Debug, Clone, Default)]
pub struct DotMetadata<'a> {
    /// Source image filename, emitted as `// Source: <filename>`.
    pub title: Option<&'a str>,

    /// Human-readable pipeline parameters, emitted as a `//` comment.
    pub description: Option<&'a str>,
}

/// Black text on light fills, white text on dark ones.
fn font_color(color: Color) -> &'static str {
    // Rec. 601 luma, integer form.
    let luma =
        299 * u32::from(color.red) + 587 * u32::from(color.green) + 114 * u32::from(color.blue);
    if luma >= 128_000 { "black" } else { "white" }
}

/// Serialize colors and their MST as a Graphviz DOT graph.
///
/// # Errors
///
/// Returns [`ExportError::VertexOutOfRange`] if an edge refers to a
/// vertex outside `colors`.
pub fn to_dot(
    colors: &[Color],
    mst: &MstResult,
    metadata: &DotMetadata<'_>,
) -> Result<String, ExportError> {
    let mut out = String::new();

    // --- Metadata header ---
    let _ = writeln!(out, "// palettree");
    if let Some(title) = metadata.title {
        for line in title.lines() {
            let _ = writeln!(out, "// Source: {line}");
        }
    }
    if let Some(description) = metadata.description {
        for line in description.lines() {
            let _ = writeln!(out, "// {line}");
        }
    }
    let _ = writeln!(
        out,
        "// {} colors, total weight {:.6}",
        colors.len(),
        mst.total_weight()
    );

    let _ = writeln!(out, "graph palette {{");
    let _ = writeln!(out, "  node [shape=box, style=filled];");

    for (index, &color) in colors.iter().enumerate() {
        let hex = color.to_hex();
        let _ = writeln!(
            out,
            "  {index} [label=\"{hex}\", fillcolor=\"{hex}\", fontcolor={}];",
            font_color(color),
        );
    }

    for edge in mst.edges() {
        endpoints(colors, edge)?;
        let _ = writeln!(
            out,
            "  {} -- {} [label=\"{:.2}\"];",
            edge.from, edge.to, edge.weight
        );
    }

    let _ = writeln!(out, "}}");
    Ok(out)
}
