// options.rs - Configuration for the importance engine
use std::path::Path;

use serde::{Deserialize, Serialize};
use vesta_common::prelude::*;
use vesta_common::types::protocol;

/// Options for a POI importance calculator.
///
/// Defaults mirror the pinned protocol constants in
/// [`vesta_common::types::protocol`]. Everything here is consensus-relevant
/// except `retention_depth`: divergent values on different nodes produce
/// divergent importance scores, so options are fixed at node configuration
/// time and validated once, never varied per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiOptions {
    /// PageRank damping factor (scaled)
    pub damping: ScoreRaw,

    /// L1 convergence threshold for the power iteration (scaled)
    pub epsilon: ScoreRaw,

    /// Hard cap on power iterations; hitting it truncates
    pub max_iterations: u32,

    /// Aggregated outlink edges lighter than this are dropped
    pub min_outlink_weight: Amount,

    /// Enable the clustering/outlier pass
    pub clustering_enabled: bool,

    /// Minimum cluster size as a fraction of the node count (scaled)
    pub min_cluster_fraction: ScoreRaw,

    /// Absolute floor on the minimum cluster size
    pub min_cluster_size: usize,

    /// Score multiplier for members of undersized clusters (scaled)
    pub outlier_weight: ScoreRaw,

    /// Epochs an account must stay active before its graph score counts
    pub min_node_age: NodeAge,

    /// Graph score ceiling for accounts below the maturity threshold (scaled)
    pub new_node_floor: ScoreRaw,

    /// Weight of the stake score in the combination (scaled)
    pub stake_weight: ScoreRaw,

    /// Weight of the graph score in the combination (scaled)
    pub graph_weight: ScoreRaw,

    /// Lookback window length in blocks for the transfer graph
    pub lookback_blocks: u64,

    /// Importance history entries retained per account.
    /// Constrained deployments set 1 and keep only the newest entry;
    /// this is a deliberate degraded mode, not a capability probe.
    pub retention_depth: usize,
}

impl Default for PoiOptions {
    fn default() -> Self {
        Self {
            damping: protocol::DAMPING_FACTOR,
            epsilon: protocol::CONVERGENCE_EPSILON,
            max_iterations: protocol::MAX_POWER_ITERATIONS,
            min_outlink_weight: protocol::MIN_OUTLINK_WEIGHT,
            clustering_enabled: true,
            min_cluster_fraction: protocol::MIN_CLUSTER_FRACTION,
            min_cluster_size: protocol::MIN_CLUSTER_SIZE,
            outlier_weight: protocol::OUTLIER_WEIGHT,
            min_node_age: protocol::MIN_NODE_AGE,
            new_node_floor: protocol::NEW_NODE_FLOOR,
            stake_weight: protocol::STAKE_WEIGHT,
            graph_weight: protocol::GRAPH_WEIGHT,
            lookback_blocks: protocol::OUTLINK_HISTORY_BLOCKS,
            retention_depth: 1,
        }
    }
}

impl PoiOptions {
    /// Validate configuration
    pub fn validate(&self) -> VestaResult<()> {
        if self.damping >= SCORE_SCALE {
            return Err(VestaError::config("damping must be below 1.0"));
        }
        if self.epsilon == 0 {
            return Err(VestaError::config("epsilon must be greater than 0"));
        }
        if self.max_iterations == 0 {
            return Err(VestaError::config("max_iterations must be greater than 0"));
        }
        if self.stake_weight + self.graph_weight != SCORE_SCALE {
            return Err(VestaError::config(
                "stake_weight and graph_weight must sum to 1.0",
            ));
        }
        if self.outlier_weight > SCORE_SCALE {
            return Err(VestaError::config("outlier_weight must be at most 1.0"));
        }
        if self.lookback_blocks == 0 {
            return Err(VestaError::config("lookback_blocks must be greater than 0"));
        }
        Ok(())
    }

    /// Loads and validates options from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> VestaResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let options: Self =
            toml::from_str(&raw).map_err(|e| VestaError::config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Minimum cluster size for a graph of `n` nodes: the configured
    /// fraction of the node count, never below the absolute floor.
    pub fn min_cluster_size_for(&self, n: usize) -> usize {
        let fractional = fixed::mul_div(n as u64, self.min_cluster_fraction, SCORE_SCALE) as usize;
        fractional.max(self.min_cluster_size)
    }
}
