//! Vested-stake score calculation
//!
//! Each active account's stake score is its vested balance as a share of
//! the total vested stake at the snapshot height. Pure scaled-integer math
//! over the read-only snapshot; no account state is touched.

use tracing::warn;
use vesta_common::prelude::*;
use vesta_state::StateSnapshot;

/// Computes the stake score of every snapshot account, in snapshot order.
///
/// When the cumulative vested stake is zero (genesis edge case) every score
/// is zero rather than a division by zero; the condition is logged and the
/// recalculation proceeds.
pub fn stake_scores(snapshot: &StateSnapshot) -> Vec<ScoreRaw> {
    let total: u128 = snapshot.vested.iter().map(|&v| v as u128).sum();
    if total == 0 {
        warn!(
            height = snapshot.height,
            accounts = snapshot.vested.len(),
            "cumulative vested stake is zero; stake scores default to zero"
        );
        return vec![0; snapshot.vested.len()];
    }
    snapshot
        .vested
        .iter()
        .map(|&v| (v as u128 * SCORE_SCALE as u128 / total) as ScoreRaw)
        .collect()
}
