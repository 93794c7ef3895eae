//vesta-common/src/types.rs
//! Common type definitions and protocol constants used throughout Vesta

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Account address - 32-byte public key hash
pub type Address = [u8; 32];

/// Block height
pub type BlockHeight = u64;

/// Balance amount in micro-units
pub type Amount = u64;

/// Dense graph node identifier, valid for a single recalculation epoch only
pub type NodeId = u32;

/// Number of consecutive recalculation epochs an account has stayed active
pub type NodeAge = u32;

/// Derives an address from arbitrary seed bytes (SHA-256).
///
/// The real key derivation lives in the crypto engine, which is an external
/// collaborator; this helper exists for genesis bootstrapping and tests.
pub fn derive_address(seed: &[u8]) -> Address {
    Sha256::digest(seed).into()
}

/// Short hex form of an address for log output
pub fn short_address(address: &Address) -> String {
    hex::encode(&address[..4])
}

/// Consensus protocol constants
///
/// These values are consensus-relevant: every node must run with the same
/// ones or importance scores (and therefore block-producer selection) will
/// diverge. They are pinned here rather than read from node configuration.
pub mod protocol {
    use crate::fixed::{ScoreRaw, SCORE_SCALE};

    /// Blocks per vesting interval (estimated blocks per day)
    pub const VESTING_INTERVAL_BLOCKS: u64 = 1440;

    /// Fraction of the unvested part retained after each elapsed interval.
    /// One tenth of the remainder vests per interval.
    pub const UNVESTED_DECAY_NUMERATOR: u64 = 9;
    /// Denominator of the unvested decay fraction
    pub const UNVESTED_DECAY_DENOMINATOR: u64 = 10;

    /// Importance is recalculated every this many blocks
    pub const IMPORTANCE_RECALC_INTERVAL: u64 = 359;

    /// Lookback window feeding the transfer graph (30 days of blocks)
    pub const OUTLINK_HISTORY_BLOCKS: u64 = 43_200;

    /// PageRank damping factor
    pub const DAMPING_FACTOR: ScoreRaw = SCORE_SCALE * 85 / 100;

    /// L1 convergence threshold for the power iteration
    pub const CONVERGENCE_EPSILON: ScoreRaw = SCORE_SCALE / 100_000_000;

    /// Hard cap on power iterations; hitting it truncates, it is not an error
    pub const MAX_POWER_ITERATIONS: u32 = 1000;

    /// Weight of the vested-stake score in the combined importance
    pub const STAKE_WEIGHT: ScoreRaw = SCORE_SCALE * 7 / 10;
    /// Weight of the graph score in the combined importance
    pub const GRAPH_WEIGHT: ScoreRaw = SCORE_SCALE * 3 / 10;

    /// Score multiplier applied to members of undersized clusters
    pub const OUTLIER_WEIGHT: ScoreRaw = SCORE_SCALE * 9 / 10;

    /// Minimum cluster size as a fraction of the node count
    pub const MIN_CLUSTER_FRACTION: ScoreRaw = SCORE_SCALE * 5 / 100;
    /// Absolute floor on the minimum cluster size
    pub const MIN_CLUSTER_SIZE: usize = 3;

    /// Epochs an account must stay active before its graph score counts
    pub const MIN_NODE_AGE: u32 = 2;
    /// Graph score ceiling for accounts below the maturity threshold
    pub const NEW_NODE_FLOOR: ScoreRaw = SCORE_SCALE / 1_000_000;

    /// Outlink edges lighter than this are dropped from the graph
    pub const MIN_OUTLINK_WEIGHT: u64 = 1_000_000;
}

/// Version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Crate version string
    pub version: String,
    /// Snapshot/protocol compatibility version
    pub protocol_version: u32,
}

impl VersionInfo {
    /// Returns version information for the running build
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            protocol_version: crate::PROTOCOL_VERSION,
        }
    }
}
