//! Property checks on extraction and MST construction over pseudo-random
//! inputs, cross-validated against petgraph's own MST.

#![allow(clippy::unwrap_used, clippy::cast_possible_truncation)]

use std::collections::HashSet;

use palettree_pipeline::verify::{is_spanning_tree, tree_weight, weights_match_colors};
use palettree_pipeline::{
    Color, MstBuilder, MstStrategy, PixelGrid, extract_distinct_colors, mst,
};
use petgraph::algo::min_spanning_tree;
use petgraph::data::Element;
use petgraph::graph::UnGraph;

/// PCG-XSH-RR generator; deterministic so failures reproduce.
struct Pcg {
    state: u64,
}

impl Pcg {
    const fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(0x5851_F42D_4C95_7F2D),
        }
    }

    fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    fn below(&mut self, n: u32) -> u32 {
        self.next_u32() % n
    }

    fn color(&mut self) -> Color {
        let v = self.next_u32();
        Color::new(v as u8, (v >> 8) as u8, (v >> 16) as u8)
    }

    /// A color from a small palette, so duplicates and ties are common.
    fn coarse_color(&mut self) -> Color {
        Color::new(
            (self.below(4) * 20) as u8,
            (self.below(4) * 20) as u8,
            (self.below(2) * 20) as u8,
        )
    }
}

/// Reference MST weight from petgraph's Kruskal over the complete graph.
fn reference_weight(colors: &[Color]) -> f64 {
    let mut graph = UnGraph::<(), f64>::new_undirected();
    let nodes: Vec<_> = colors.iter().map(|_| graph.add_node(())).collect();
    for i in 0..colors.len() {
        for j in (i + 1)..colors.len() {
            graph.add_edge(nodes[i], nodes[j], colors[i].distance(colors[j]));
        }
    }
    min_spanning_tree(&graph)
        .filter_map(|element| match element {
            Element::Edge { weight, .. } => Some(weight),
            Element::Node { .. } => None,
        })
        .sum()
}

fn random_grid(rng: &mut Pcg, width: usize, height: usize, coarse: bool) -> PixelGrid {
    let pixels = (0..width * height)
        .map(|_| {
            if coarse {
                rng.coarse_color()
            } else {
                rng.color()
            }
        })
        .collect();
    PixelGrid::new(width, height, pixels).unwrap()
}

fn unique_colors(rng: &mut Pcg, n: usize) -> Vec<Color> {
    let mut seen = HashSet::new();
    let mut colors = Vec::with_capacity(n);
    while colors.len() < n {
        let c = rng.color();
        if seen.insert(c) {
            colors.push(c);
        }
    }
    colors
}

#[test]
fn extraction_is_unique_ordered_and_bounded() {
    let mut rng = Pcg::new(7);
    for trial in 0..40 {
        let width = 1 + rng.below(12) as usize;
        let height = 1 + rng.below(12) as usize;
        let grid = random_grid(&mut rng, width, height, trial % 2 == 0);
        let colors = extract_distinct_colors(&grid).unwrap();

        let unique: HashSet<Color> = colors.iter().copied().collect();
        assert_eq!(unique.len(), colors.len(), "trial {trial}: duplicates");
        assert!(colors.len() <= width * height);

        // Reference: first occurrence order from a linear scan.
        let mut expected = Vec::new();
        for &c in grid.pixels() {
            if !expected.contains(&c) {
                expected.push(c);
            }
        }
        assert_eq!(colors.as_slice(), expected.as_slice(), "trial {trial}");
    }
}

#[test]
fn edge_count_is_n_minus_one() {
    let mut rng = Pcg::new(11);
    for n in 0..30 {
        let colors = unique_colors(&mut rng, n);
        let result = mst::dense_prim(&colors);
        assert_eq!(result.edge_count(), n.saturating_sub(1), "n={n}");
    }
}

#[test]
fn every_strategy_builds_a_spanning_tree() {
    let mut rng = Pcg::new(23);
    for n in [2, 3, 5, 17, 50] {
        let colors = unique_colors(&mut rng, n);
        for strategy in [
            MstStrategy::DensePrim,
            MstStrategy::HeapPrim,
            MstStrategy::Kruskal,
        ] {
            let result = strategy.build(&colors);
            assert!(
                is_spanning_tree(n, result.edges()),
                "{strategy:?} n={n}: not a spanning tree"
            );
            assert!(weights_match_colors(&colors, result.edges(), 1e-9));
            assert!((tree_weight(result.edges()) - result.total_weight()).abs() < 1e-6);
        }
    }
}

#[test]
fn total_weight_matches_reference_on_random_sets() {
    let mut rng = Pcg::new(0x00C0_FFEE);
    for trial in 0..60 {
        let n = 1 + rng.below(50) as usize;
        let colors = unique_colors(&mut rng, n);
        let expected = reference_weight(&colors);
        for strategy in [
            MstStrategy::DensePrim,
            MstStrategy::HeapPrim,
            MstStrategy::Kruskal,
        ] {
            let got = strategy.build(&colors).total_weight();
            assert!(
                (got - expected).abs() < 1e-6,
                "trial {trial} {strategy:?}: got {got}, expected {expected}"
            );
        }
    }
}

#[test]
fn total_weight_matches_reference_with_many_ties() {
    // Coarse colors on a 20-step lattice produce many equal-weight edges.
    let mut rng = Pcg::new(99);
    for trial in 0..30 {
        let grid = random_grid(&mut rng, 6, 6, true);
        let colors = extract_distinct_colors(&grid).unwrap();
        let expected = reference_weight(colors.as_slice());
        let got = mst::dense_prim(colors.as_slice()).total_weight();
        assert!(
            (got - expected).abs() < 1e-6,
            "trial {trial}: got {got}, expected {expected}"
        );
    }
}

#[test]
fn dense_prim_is_deterministic() {
    let mut rng = Pcg::new(5);
    let colors = unique_colors(&mut rng, 40);
    let first = mst::dense_prim(&colors);
    let second = mst::dense_prim(&colors);
    assert_eq!(first, second);
}

#[test]
fn dense_prim_starts_at_the_first_color() {
    let mut rng = Pcg::new(31);
    let colors = unique_colors(&mut rng, 20);
    let result = mst::dense_prim(&colors);
    assert_eq!(result.edges()[0].from, 0);

    // Every edge's parent is already in the tree when the edge is added.
    let mut in_tree = vec![false; colors.len()];
    in_tree[0] = true;
    for edge in result.edges() {
        assert!(in_tree[edge.from], "parent {} not yet in tree", edge.from);
        assert!(!in_tree[edge.to], "vertex {} added twice", edge.to);
        in_tree[edge.to] = true;
    }
}
