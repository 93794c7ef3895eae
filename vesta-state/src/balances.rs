//! Weighted-balance ledger with deterministic vesting
//!
//! Every balance-affecting event is appended as an entry; the vested and
//! unvested parts at any height are derived by replaying the entry sequence.
//! All arithmetic is integer-only so independent replays are bit-identical.
//!
//! Vesting rule: credits enter the unvested bucket. Each time a vesting
//! interval boundary is crossed, one tenth of the remaining unvested part
//! (integer division, 9/10 retained) moves to the vested bucket. Debits
//! drain both buckets proportionally to their current shares.

use serde::{Deserialize, Serialize};
use vesta_common::prelude::*;
use vesta_common::types::protocol::{
    UNVESTED_DECAY_DENOMINATOR, UNVESTED_DECAY_NUMERATOR, VESTING_INTERVAL_BLOCKS,
};

/// Kind of a balance-affecting ledger entry
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceChange {
    /// Incoming funds, subject to vesting
    Credit,
    /// Outgoing funds
    Debit,
    /// Incoming funds that skip vesting entirely (genesis allocations)
    FullyVestedCredit,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
struct BalanceEntry {
    height: BlockHeight,
    amount: Amount,
    kind: BalanceChange,
}

/// Append-only record of one account's balance history
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct WeightedBalances {
    entries: Vec<BalanceEntry>,
    // running total, kept in sync on append
    total: Amount,
}

impl WeightedBalances {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a balance-affecting entry at the given height.
    ///
    /// Heights must be non-decreasing. A debit that would drive the
    /// cumulative balance negative fails with
    /// [`VestaError::InvalidBalance`] and leaves the ledger untouched.
    pub fn record_balance_change(
        &mut self,
        height: BlockHeight,
        amount: Amount,
        kind: BalanceChange,
    ) -> VestaResult<()> {
        if let Some(last) = self.entries.last() {
            if height < last.height {
                return Err(VestaError::state(format!(
                    "ledger entry at height {} precedes last entry at {}",
                    height, last.height
                )));
            }
        }

        match kind {
            BalanceChange::Debit => {
                if amount > self.total {
                    return Err(VestaError::InvalidBalance {
                        height,
                        requested: amount,
                        available: self.total,
                    });
                }
                self.total -= amount;
            }
            BalanceChange::Credit | BalanceChange::FullyVestedCredit => {
                self.total = self
                    .total
                    .checked_add(amount)
                    .ok_or_else(|| VestaError::state("balance overflow"))?;
            }
        }

        self.entries.push(BalanceEntry {
            height,
            amount,
            kind,
        });
        Ok(())
    }

    /// Total balance after replaying all entries up to and including `height`
    pub fn total_balance(&self, height: BlockHeight) -> Amount {
        let mut total: Amount = 0;
        for entry in self.entries.iter().take_while(|e| e.height <= height) {
            match entry.kind {
                BalanceChange::Debit => total -= entry.amount,
                _ => total += entry.amount,
            }
        }
        total
    }

    /// Vested part of the balance as of `height`
    pub fn vested_balance(&self, height: BlockHeight) -> Amount {
        self.split_at(height).0
    }

    /// Unvested part of the balance as of `height`
    pub fn unvested_balance(&self, height: BlockHeight) -> Amount {
        self.split_at(height).1
    }

    /// Height of the first ledger entry, if any
    pub fn first_height(&self) -> Option<BlockHeight> {
        self.entries.first().map(|e| e.height)
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries have been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries above `height` (chain rollback support) and
    /// restores the running total to match the remaining entries.
    pub fn undo_chain(&mut self, height: BlockHeight) {
        self.entries.retain(|e| e.height <= height);
        self.total = self.total_balance(height);
    }

    // Replays the ledger and returns (vested, unvested) at the query height.
    fn split_at(&self, height: BlockHeight) -> (Amount, Amount) {
        let mut vested: Amount = 0;
        let mut unvested: Amount = 0;
        let mut cursor: Option<BlockHeight> = None;

        for entry in self.entries.iter().take_while(|e| e.height <= height) {
            if let Some(from) = cursor {
                decay(&mut vested, &mut unvested, from, entry.height);
            }
            cursor = Some(entry.height);

            match entry.kind {
                BalanceChange::Credit => unvested += entry.amount,
                BalanceChange::FullyVestedCredit => vested += entry.amount,
                BalanceChange::Debit => drain(&mut vested, &mut unvested, entry.amount),
            }
        }

        if let Some(from) = cursor {
            decay(&mut vested, &mut unvested, from, height);
        }
        (vested, unvested)
    }
}

// Advances the vesting schedule across every interval boundary strictly
// between `from` and `to`. A boundary is an exact multiple of the vesting
// interval; it takes effect only once the chain moves past it.
fn decay(vested: &mut Amount, unvested: &mut Amount, from: BlockHeight, to: BlockHeight) {
    let interval = VESTING_INTERVAL_BLOCKS;
    let mut boundary = (from + interval - 1) / interval * interval;
    while to > boundary {
        let retained = (*unvested as u128 * UNVESTED_DECAY_NUMERATOR as u128
            / UNVESTED_DECAY_DENOMINATOR as u128) as Amount;
        *vested += *unvested - retained;
        *unvested = retained;
        boundary += interval;
    }
}

// Removes `amount` from the two buckets proportionally to their shares,
// rounding in favor of the unvested side.
fn drain(vested: &mut Amount, unvested: &mut Amount, amount: Amount) {
    let total = *vested + *unvested;
    if amount == 0 || total == 0 {
        return;
    }
    let mut from_unvested = fixed::mul_div(amount, *unvested, total);
    let mut from_vested = amount - from_unvested;
    if from_vested > *vested {
        from_unvested += from_vested - *vested;
        from_vested = *vested;
    }
    *vested -= from_vested;
    *unvested -= from_unvested;
}
