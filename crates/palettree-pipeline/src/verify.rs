//! Structural checks on MST output.
//!
//! Used by tests and by callers that receive trees from elsewhere (e.g. a
//! deserialized [`MstResult`](crate::MstResult)) and want to confirm they
//! are well-formed before clustering on them.

use petgraph::unionfind::UnionFind;

use crate::types::{Color, MstEdge};

/// Returns `true` if `edges` form a spanning tree over vertices
/// `0..vertex_count`.
///
/// A spanning tree has exactly `vertex_count - 1` edges, every endpoint
/// in range, and no cycle. With that edge count, acyclic implies
/// connected. Zero or one vertex requires zero edges.
#[must_use]
pub fn is_spanning_tree(vertex_count: usize, edges: &[MstEdge]) -> bool {
    if edges.len() != vertex_count.saturating_sub(1) {
        return false;
    }

    let mut uf = UnionFind::<usize>::new(vertex_count);
    edges.iter().all(|edge| {
        edge.from < vertex_count && edge.to < vertex_count && uf.union(edge.from, edge.to)
    })
}

/// Sum of edge weights.
#[must_use]
pub fn tree_weight(edges: &[MstEdge]) -> f64 {
    edges.iter().map(|e| e.weight).sum()
}

/// Returns `true` if every edge weight equals the distance between its
/// endpoint colors, within `tolerance`.
///
/// Edges with an endpoint outside `colors` fail the check.
#[must_use]
pub fn weights_match_colors(colors: &[Color], edges: &[MstEdge], tolerance: f64) -> bool {
    edges.iter().all(|edge| {
        match (colors.get(edge.from), colors.get(edge.to)) {
            (Some(&a), Some(&b)) => (a.distance(b) - edge.weight).abs() <= tolerance,
            _ => false,
        }
    })
}
