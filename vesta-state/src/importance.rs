//! Per-account importance records and bounded history

use serde::{Deserialize, Serialize};
use vesta_common::prelude::*;

/// One importance result for one account at one recalculation height.
///
/// `importance` and `graph_score` are fixed-point values in
/// `[0, SCORE_SCALE]`; the importance values of all active accounts at a
/// given height sum to `SCORE_SCALE` within the normalization tolerance.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountImportance {
    /// Recalculation height this record belongs to
    pub height: BlockHeight,
    /// Normalized combined importance
    pub importance: ScoreRaw,
    /// Structural graph score that fed the combination
    pub graph_score: ScoreRaw,
}

impl VestaSerialize for AccountImportance {
    fn preferred_encoding() -> EncodingType {
        EncodingType::Bincode
    }
}

/// Bounded, oldest-first sequence of importance records for one account.
///
/// On constrained deployments the retention depth is 1 and only the most
/// recent entry survives between prunes; callers must not assume more than
/// one entry is available.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct HistoricalImportances {
    entries: Vec<AccountImportance>,
}

impl HistoricalImportances {
    /// Appends a record and prunes to the retention depth.
    /// A depth of zero is treated as one: the newest entry always survives.
    pub fn push(&mut self, entry: AccountImportance, retention_depth: usize) {
        self.entries.push(entry);
        let keep = retention_depth.max(1);
        if self.entries.len() > keep {
            let excess = self.entries.len() - keep;
            self.entries.drain(..excess);
        }
    }

    /// All retained records, oldest first
    pub fn entries(&self) -> &[AccountImportance] {
        &self.entries
    }

    /// The most recent record, if any
    pub fn latest(&self) -> Option<&AccountImportance> {
        self.entries.last()
    }

    /// Number of retained records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no records are retained
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
