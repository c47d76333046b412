//! CSV edge-list export.
//!
//! One row per MST edge, in the order the edges joined the tree:
//!
//! ```text
//! from,to,weight,from_hex,to_hex
//! 0,2,10.000000,#000000,#0a0000
//! ```
//!
//! Weights are written with six decimal places. No field ever needs
//! quoting: indices are integers and colors are `#rrggbb`.

use std::fmt::Write;

use palettree_pipeline::{Color, MstResult};

use crate::{ExportError, endpoints};

/// Header row emitted before the edges.
pub const HEADER: &str = "from,to,weight,from_hex,to_hex";

/// Serialize an MST as a CSV edge list.
///
/// # Errors
///
/// Returns [`ExportError::VertexOutOfRange`] if an edge refers to a
/// vertex outside `colors`.
pub fn to_csv(colors: &[Color], mst: &MstResult) -> Result<String, ExportError> {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADER}");

    for edge in mst.edges() {
        let (from, to) = endpoints(colors, edge)?;
        let _ = writeln!(
            out,
            "{},{},{:.6},{},{}",
            edge.from,
            edge.to,
            edge.weight,
            from.to_hex(),
            to.to_hex(),
        );
    }

    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use palettree_pipeline::mst::dense_prim;

    use super::*;

    fn right_angle() -> Vec<Color> {
        vec![
            Color::new(0, 0, 0),
            Color::new(10, 0, 0),
            Color::new(0, 10, 0),
        ]
    }

    #[test]
    fn empty_tree_is_header_only() {
        let csv = to_csv(&[Color::new(1, 2, 3)], &MstResult::empty()).unwrap();
        assert_eq!(csv, format!("{HEADER}\n"));
    }

    #[test]
    fn rows_follow_inclusion_order() {
        let colors = right_angle();
        let csv = to_csv(&colors, &dense_prim(&colors)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                HEADER,
                "0,1,10.000000,#000000,#0a0000",
                "0,2,10.000000,#000000,#000a00",
            ]
        );
    }

    #[test]
    fn mismatched_colors_are_rejected() {
        let colors = right_angle();
        let mst = dense_prim(&colors);
        let result = to_csv(&colors[..2], &mst);
        assert!(matches!(
            result,
            Err(ExportError::VertexOutOfRange { index: 2, len: 2 })
        ));
    }
}
