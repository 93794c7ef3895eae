use serde::{Deserialize, Serialize};
use vesta_common::prelude::*;

use crate::balances::WeightedBalances;
use crate::importance::{AccountImportance, HistoricalImportances};

/// Full state of one account: its balance ledger, the current importance
/// slot, and the retained importance history.
///
/// Created the first time an address is observed; never deleted, though the
/// history may be pruned down to a single entry.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AccountState {
    /// The account address
    pub address: Address,
    /// Balance-affecting event ledger
    pub balances: WeightedBalances,
    importance: Option<AccountImportance>,
    historical: HistoricalImportances,
}

impl AccountState {
    /// Creates a fresh account state for an address
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balances: WeightedBalances::new(),
            importance: None,
            historical: HistoricalImportances::default(),
        }
    }

    /// Current importance record, unset until the first recalculation pass
    pub fn current_importance(&self) -> Option<&AccountImportance> {
        self.importance.as_ref()
    }

    /// Retained importance history
    pub fn historical_importances(&self) -> &HistoricalImportances {
        &self.historical
    }

    /// Writes the current importance slot and appends to the history,
    /// applying the retention policy. Called only from the store's commit.
    pub(crate) fn set_importance(&mut self, entry: AccountImportance, retention_depth: usize) {
        self.importance = Some(entry);
        self.historical.push(entry, retention_depth);
    }
}

impl VestaSerialize for AccountState {
    fn preferred_encoding() -> EncodingType {
        EncodingType::Bincode
    }
}
