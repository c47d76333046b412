//! Minimum spanning tree over color vertices.
//!
//! The graph is complete: every pair of distinct colors is joined by an
//! edge weighted by their Euclidean distance in RGB space. Edges are
//! never materialized by the Prim builders; weights are computed on demand
//! from the color list.
//!
//! This module defines the [`MstBuilder`] trait for pluggable construction
//! strategies and the [`MstStrategy`] enum for runtime selection. All
//! strategies produce a tree of the same (minimal) total weight. Only
//! [`MstStrategy::DensePrim`] guarantees a specific edge sequence: start
//! at vertex 0, and on equal keys prefer the lowest vertex index.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::types::{Color, MstEdge, MstResult, PipelineError};

/// Largest vertex set [`MstStrategy::Kruskal`] accepts.
///
/// Kruskal sorts all `n * (n - 1) / 2` edges up front; at this bound that
/// is about 8.4 million edges.
pub const KRUSKAL_MAX_VERTICES: usize = 4096;

/// Selects which MST construction algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MstStrategy {
    /// Heap-free Prim's algorithm: O(n^2) time, O(n) space.
    ///
    /// Each step relaxes every outside vertex against the newest tree
    /// vertex, then linearly scans for the cheapest. On a complete graph
    /// this matches the edge count, so a heap buys nothing.
    #[default]
    DensePrim,

    /// Prim's algorithm driven by a binary heap of candidate edges.
    ///
    /// Same total weight as [`DensePrim`](Self::DensePrim); the edge
    /// order may differ when several candidates tie.
    HeapPrim,

    /// Kruskal's algorithm over the fully materialized edge list.
    ///
    /// Quadratic memory, so limited to [`KRUSKAL_MAX_VERTICES`]. Useful
    /// as an independent cross-check on small color sets.
    Kruskal,
}

impl MstStrategy {
    /// Largest vertex count this strategy accepts, if bounded.
    #[must_use]
    pub const fn max_vertices(self) -> Option<usize> {
        match self {
            Self::DensePrim | Self::HeapPrim => None,
            Self::Kruskal => Some(KRUSKAL_MAX_VERTICES),
        }
    }

    /// Build the tree, enforcing [`max_vertices`](Self::max_vertices).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `colors` exceeds the
    /// strategy's vertex limit.
    pub fn build_checked(self, colors: &[Color]) -> Result<MstResult, PipelineError> {
        if let Some(max) = self.max_vertices()
            && colors.len() > max
        {
            return Err(PipelineError::InvalidConfig(format!(
                "{self:?} supports at most {max} colors, image has {}",
                colors.len()
            )));
        }
        Ok(self.build(colors))
    }
}

/// Trait for MST construction strategies.
///
/// Input: colors indexed by vertex. Output: `max(n - 1, 0)` edges and
/// their total weight.
pub trait MstBuilder {
    /// Build a minimum spanning tree over the complete color graph.
    fn build(&self, colors: &[Color]) -> MstResult;
}

impl MstBuilder for MstStrategy {
    fn build(&self, colors: &[Color]) -> MstResult {
        match *self {
            Self::DensePrim => dense_prim(colors),
            Self::HeapPrim => heap_prim(colors),
            Self::Kruskal => kruskal(colors),
        }
    }
}

/// Dense Prim's algorithm starting from vertex 0.
///
/// `key[v]` is the cheapest known connection from outside vertex `v` to
/// the tree and `parent[v]` the tree vertex achieving it. Each iteration
/// relaxes against the vertex added last and selects the minimum key in
/// the same ascending pass. Strict comparisons make the first (lowest
/// index) minimum win.
#[must_use]
pub fn dense_prim(colors: &[Color]) -> MstResult {
    let n = colors.len();
    if n <= 1 {
        return MstResult::empty();
    }

    let mut in_tree = vec![false; n];
    let mut key = vec![f64::INFINITY; n];
    let mut parent = vec![0_usize; n];
    let mut edges = Vec::with_capacity(n - 1);
    let mut total_weight = 0.0;
    let mut current = 0;

    for _ in 1..n {
        in_tree[current] = true;
        let origin = colors[current];

        let mut chosen = None;
        let mut best = f64::INFINITY;
        for (v, &color) in colors.iter().enumerate() {
            if in_tree[v] {
                continue;
            }
            let d = origin.distance(color);
            if d < key[v] {
                key[v] = d;
                parent[v] = current;
            }
            if key[v] < best {
                best = key[v];
                chosen = Some(v);
            }
        }

        // Every outside vertex was just relaxed to a finite key.
        let Some(next) = chosen else { break };
        edges.push(MstEdge::new(parent[next], next, key[next]));
        total_weight += key[next];
        current = next;
    }

    MstResult::from_parts(edges, total_weight)
}

/// A candidate edge on the Prim frontier.
///
/// Ordered so that [`BinaryHeap`] (a max-heap) pops the lightest edge
/// first, then the lowest target vertex.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    weight: f64,
    vertex: usize,
    parent: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Heap-based (lazy) Prim's algorithm starting from vertex 0.
///
/// A candidate is pushed only when it improves the vertex's best key;
/// stale entries for vertices already in the tree are skipped on pop.
#[must_use]
pub fn heap_prim(colors: &[Color]) -> MstResult {
    let n = colors.len();
    if n <= 1 {
        return MstResult::empty();
    }

    let mut in_tree = vec![false; n];
    let mut key = vec![f64::INFINITY; n];
    let mut heap = BinaryHeap::new();
    let mut edges = Vec::with_capacity(n - 1);
    let mut total_weight = 0.0;

    let mut current = 0;
    in_tree[current] = true;

    while edges.len() < n - 1 {
        let origin = colors[current];
        for (v, &color) in colors.iter().enumerate() {
            if in_tree[v] {
                continue;
            }
            let d = origin.distance(color);
            if d < key[v] {
                key[v] = d;
                heap.push(Candidate {
                    weight: d,
                    vertex: v,
                    parent: current,
                });
            }
        }

        let next = loop {
            match heap.pop() {
                Some(c) if in_tree[c.vertex] => {}
                other => break other,
            }
        };
        let Some(next) = next else { break };

        in_tree[next.vertex] = true;
        edges.push(MstEdge::new(next.parent, next.vertex, next.weight));
        total_weight += next.weight;
        current = next.vertex;
    }

    MstResult::from_parts(edges, total_weight)
}

/// Kruskal's algorithm over every pair of colors.
///
/// Edges are sorted by weight, then by `(from, to)`, and accepted when
/// they join two components. Each accepted edge is reported with the
/// lower vertex index as `from`.
#[must_use]
pub fn kruskal(colors: &[Color]) -> MstResult {
    let n = colors.len();
    if n <= 1 {
        return MstResult::empty();
    }

    let mut candidates: Vec<MstEdge> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .map(|(i, j)| MstEdge::new(i, j, colors[i].distance(colors[j])))
        .collect();
    candidates.sort_by(|a, b| {
        a.weight
            .total_cmp(&b.weight)
            .then_with(|| (a.from, a.to).cmp(&(b.from, b.to)))
    });

    let mut uf = UnionFind::<usize>::new(n);
    let mut edges = Vec::with_capacity(n - 1);
    let mut total_weight = 0.0;

    for edge in candidates {
        if uf.union(edge.from, edge.to) {
            total_weight += edge.weight;
            edges.push(edge);
            if edges.len() == n - 1 {
                break; // MST complete.
            }
        }
    }

    MstResult::from_parts(edges, total_weight)
}
