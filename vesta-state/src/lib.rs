//! # Vesta State Management
//!
//! This crate owns the account-model state that the importance engine reads
//! and writes: per-account weighted-balance ledgers, the current importance
//! slot, and the bounded importance history.
//!
//! ## Architecture Overview
//!
//! The central type is [`AccountStore`], an arena of [`AccountState`]
//! records indexed by an address table. The store is the exclusive owner of
//! all account state; the importance engine only ever sees two views of it:
//!
//! - [`StateSnapshot`] - a versioned, read-only snapshot of the vested
//!   balances of the active set at a height, taken at the start of a
//!   recalculation pass
//! - [`ImportanceResults`] - the full output of a pass, applied through
//!   [`AccountStore::commit`] as a single atomic publish point
//!
//! A pass either fully commits or is fully discarded: the snapshot carries
//! the store generation it was taken at, and a commit from a superseded
//! generation is rejected. Partial results are never observable.
//!
//! ## Example Usage
//!
//! ```
//! use vesta_state::AccountStore;
//! use vesta_common::types::derive_address;
//!
//! # fn example() -> vesta_common::error::VestaResult<()> {
//! let mut store = AccountStore::new();
//! let alice = derive_address(b"alice");
//! let bob = derive_address(b"bob");
//! store.credit_fully_vested(&alice, 1, 1_000_000)?;
//! store.apply_transfer(10, &alice, &bob, 250_000)?;
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;
use vesta_common::prelude::*;
use vesta_common::types::short_address;

pub mod account;
pub mod balances;
pub mod importance;

pub use account::AccountState;
pub use balances::{BalanceChange, WeightedBalances};
pub use importance::{AccountImportance, HistoricalImportances};

/// Read-only view of the active set taken at the start of a recalculation
/// pass. Addresses are in ascending order, matching the node index the pass
/// builds from the same active set.
#[derive(Clone, Debug)]
pub struct StateSnapshot {
    /// Store generation this snapshot was taken at
    pub generation: u64,
    /// Snapshot height
    pub height: BlockHeight,
    /// Active addresses, ascending
    pub addresses: Vec<Address>,
    /// Vested balance of each address at the snapshot height, same order
    pub vested: Vec<Amount>,
}

/// Complete output of one recalculation pass, applied atomically
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportanceResults {
    /// Generation of the snapshot the pass was computed from
    pub generation: u64,
    /// Recalculation height
    pub height: BlockHeight,
    /// History retention applied at commit
    pub retention_depth: usize,
    /// One record per active account, ascending address order
    pub entries: Vec<(Address, AccountImportance)>,
}

impl VestaSerialize for ImportanceResults {
    fn preferred_encoding() -> EncodingType {
        EncodingType::Bincode
    }
}

/// Arena of all known account states, indexed by address
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AccountStore {
    accounts: Vec<AccountState>,
    index: HashMap<Address, usize>,
    generation: u64,
}

impl AccountStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts ever observed
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True if no account has been observed yet
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Looks up an account state
    pub fn account(&self, address: &Address) -> Option<&AccountState> {
        self.index.get(address).map(|&i| &self.accounts[i])
    }

    /// Fetches an account state, creating it on first observation
    pub fn account_mut(&mut self, address: &Address) -> &mut AccountState {
        let slot = match self.index.get(address) {
            Some(&i) => i,
            None => {
                let i = self.accounts.len();
                self.accounts.push(AccountState::new(*address));
                self.index.insert(*address, i);
                i
            }
        };
        &mut self.accounts[slot]
    }

    /// Records a vesting credit (incoming transfer) at a height
    pub fn credit(&mut self, address: &Address, height: BlockHeight, amount: Amount) -> VestaResult<()> {
        self.account_mut(address)
            .balances
            .record_balance_change(height, amount, BalanceChange::Credit)
    }

    /// Records a fully vested credit (genesis allocation) at a height
    pub fn credit_fully_vested(
        &mut self,
        address: &Address,
        height: BlockHeight,
        amount: Amount,
    ) -> VestaResult<()> {
        self.account_mut(address)
            .balances
            .record_balance_change(height, amount, BalanceChange::FullyVestedCredit)
    }

    /// Applies a transfer: debits the sender, credits the recipient.
    /// An overdraft fails before either ledger is touched.
    pub fn apply_transfer(
        &mut self,
        height: BlockHeight,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> VestaResult<()> {
        self.account_mut(from)
            .balances
            .record_balance_change(height, amount, BalanceChange::Debit)?;
        self.account_mut(to)
            .balances
            .record_balance_change(height, amount, BalanceChange::Credit)
    }

    /// Takes a versioned snapshot of the active set's vested balances.
    ///
    /// Bumps the store generation: any pass still in flight from an earlier
    /// snapshot is thereby superseded and its commit will be discarded.
    pub fn snapshot(&mut self, height: BlockHeight, active: &BTreeSet<Address>) -> StateSnapshot {
        self.generation += 1;
        let addresses: Vec<Address> = active.iter().copied().collect();
        let vested = addresses
            .iter()
            .map(|a| {
                self.account(a)
                    .map(|s| s.balances.vested_balance(height))
                    .unwrap_or(0)
            })
            .collect();
        StateSnapshot {
            generation: self.generation,
            height,
            addresses,
            vested,
        }
    }

    /// Publishes the results of a recalculation pass.
    ///
    /// Returns `true` if the results were applied. A pass computed from a
    /// superseded snapshot generation is discarded wholesale and `false` is
    /// returned; no account is touched.
    pub fn commit(&mut self, results: &ImportanceResults) -> bool {
        if results.generation != self.generation {
            warn!(
                pass_generation = results.generation,
                store_generation = self.generation,
                height = results.height,
                "discarding superseded importance pass"
            );
            return false;
        }
        for (address, entry) in &results.entries {
            self.account_mut(address)
                .set_importance(*entry, results.retention_depth);
        }
        true
    }

    /// Current importance of an account, if a pass has scored it
    pub fn current_importance(&self, address: &Address) -> Option<AccountImportance> {
        self.account(address)
            .and_then(|s| s.current_importance().copied())
    }

    /// Retained importance history of an account, oldest first.
    /// May hold a single entry on constrained deployments.
    pub fn historical_importances(&self, address: &Address) -> &[AccountImportance] {
        const EMPTY: &[AccountImportance] = &[];
        self.account(address)
            .map(|s| s.historical_importances().entries())
            .unwrap_or(EMPTY)
    }

    /// Rolls every ledger back to `height` (chain reorganization support)
    pub fn undo_chain(&mut self, height: BlockHeight) {
        for state in &mut self.accounts {
            state.balances.undo_chain(height);
        }
    }

    /// Exports the full store as a binary checkpoint
    pub fn export(&self) -> VestaResult<Vec<u8>> {
        self.encode()
            .map_err(|e| VestaError::serialization(e.to_string()))
    }

    /// Restores a store from a binary checkpoint
    pub fn import(bytes: &[u8]) -> VestaResult<Self> {
        Self::decode(bytes).map_err(|e| VestaError::serialization(e.to_string()))
    }

    /// Exports importance results as JSON for diagnostics and explorers
    pub fn export_results_json(results: &ImportanceResults) -> VestaResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(results)?)
    }

    /// Debug helper: hex prefix of every known address
    pub fn describe(&self) -> Vec<String> {
        self.accounts.iter().map(|s| short_address(&s.address)).collect()
    }
}

impl VestaSerialize for AccountStore {
    fn preferred_encoding() -> EncodingType {
        EncodingType::Bincode
    }
}
