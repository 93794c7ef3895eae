//! Graph score analyzer
//!
//! Produces a structural score per node from the transfer graph:
//!
//! 1. a damped power iteration over the outgoing-weight distribution, with
//!    dangling mass redistributed uniformly (standard PageRank treatment),
//! 2. a clustering pass that detects weakly-connected components and scales
//!    down members of undersized ones (the anti-Sybil damping), and
//! 3. a maturity floor that caps the score of accounts whose node age is
//!    below the threshold, so new entrants cannot immediately dominate.
//!
//! All arithmetic is scaled-integer; each iteration reads only the previous
//! iteration's snapshot, so the result is independent of traversal order
//! and bit-identical across nodes.

use tracing::{debug, warn};
use vesta_common::prelude::*;

use crate::graph::TransferGraph;
use crate::options::PoiOptions;

/// Computes the graph score of every node, in `[0, SCORE_SCALE]`.
///
/// `ages` is indexed by node id. Non-convergence within the iteration cap
/// truncates with a warning; it is a bounded approximation, not an error.
pub fn graph_scores(graph: &TransferGraph, ages: &[NodeAge], options: &PoiOptions) -> Vec<ScoreRaw> {
    debug_assert_eq!(graph.node_count(), ages.len());
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut scores = power_iteration(graph, options);

    if options.clustering_enabled && graph.edge_count() > 0 {
        apply_cluster_damping(graph, options, &mut scores);
    }

    for (id, &age) in ages.iter().enumerate() {
        if age < options.min_node_age {
            scores[id] = scores[id].min(options.new_node_floor);
        }
    }

    scores
}

fn power_iteration(graph: &TransferGraph, options: &PoiOptions) -> Vec<ScoreRaw> {
    let n = graph.node_count();
    let damping = options.damping as u128;
    let scale = SCORE_SCALE as u128;
    let base = (scale - damping) / n as u128;

    let mut scores: Vec<ScoreRaw> = vec![(SCORE_SCALE / n as u64).max(1); n];
    let mut converged_after = None;

    for iteration in 0..options.max_iterations {
        let dangling_mass: u128 = (0..n)
            .filter(|&id| graph.is_dangling(id as NodeId))
            .map(|id| scores[id] as u128)
            .sum();
        let dangle_share = damping * dangling_mass / (n as u128 * scale);

        let mut next: Vec<u128> = vec![base + dangle_share; n];
        for src in 0..n {
            let out_sum = graph.out_weight(src as NodeId);
            if out_sum == 0 {
                continue;
            }
            let mass = scores[src] as u128;
            for &(dst, weight) in graph.out_edges(src as NodeId) {
                let flow = mass * weight as u128 / out_sum;
                next[dst as usize] += damping * flow / scale;
            }
        }

        // renormalize so truncation cannot bleed mass across iterations
        let sum: u128 = next.iter().sum();
        let mut next: Vec<ScoreRaw> = next
            .into_iter()
            .map(|v| if sum == 0 { 0 } else { (v * scale / sum) as ScoreRaw })
            .collect();

        let delta = fixed::l1_distance(&scores, &next);
        std::mem::swap(&mut scores, &mut next);
        if delta < options.epsilon {
            converged_after = Some(iteration + 1);
            break;
        }
    }

    match converged_after {
        Some(iterations) => debug!(iterations, nodes = n, "power iteration converged"),
        None => warn!(
            max_iterations = options.max_iterations,
            nodes = n,
            "power iteration truncated before convergence"
        ),
    }

    scores
}

// Finds weakly-connected components and scales down members of components
// smaller than the configured minimum cluster size.
fn apply_cluster_damping(graph: &TransferGraph, options: &PoiOptions, scores: &mut [ScoreRaw]) {
    let n = graph.node_count();
    let mut components = UnionFind::new(n);
    for src in 0..n {
        for &(dst, _) in graph.out_edges(src as NodeId) {
            components.union(src, dst as usize);
        }
    }

    let mut sizes = vec![0usize; n];
    for id in 0..n {
        sizes[components.find(id)] += 1;
    }

    let min_size = options.min_cluster_size_for(n);
    let mut damped = 0usize;
    for id in 0..n {
        if sizes[components.find(id)] < min_size {
            scores[id] = fixed::scale(scores[id], options.outlier_weight);
            damped += 1;
        }
    }

    let cluster_count = sizes.iter().filter(|&&s| s > 0).count();
    debug!(
        clusters = cluster_count,
        min_size,
        damped_nodes = damped,
        "cluster damping applied"
    );
}

struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}
