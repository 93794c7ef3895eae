//! Per-epoch node index
//!
//! The graph analyzer works on dense adjacency structures, so every
//! recalculation epoch starts by mapping the active address set to ids
//! `0..N-1`. The mapping is a pure function of the set: addresses are taken
//! in ascending order, which every node computes identically. Ids are valid
//! only for the epoch they were built in and are never persisted.

use std::collections::{BTreeMap, BTreeSet};

use vesta_common::prelude::*;

/// Dense address -> node id mapping for one recalculation epoch
#[derive(Clone, Debug)]
pub struct NodeIndex {
    ids: BTreeMap<Address, NodeId>,
    addresses: Vec<Address>,
}

impl NodeIndex {
    /// Builds the index from the active set, assigning ids in ascending
    /// address order. Fails with [`VestaError::EmptyActiveSet`] when there
    /// is nothing to index; the caller skips the recalculation.
    pub fn build(height: BlockHeight, active: &BTreeSet<Address>) -> VestaResult<Self> {
        if active.is_empty() {
            return Err(VestaError::EmptyActiveSet { height });
        }
        let addresses: Vec<Address> = active.iter().copied().collect();
        let ids = addresses
            .iter()
            .enumerate()
            .map(|(i, a)| (*a, i as NodeId))
            .collect();
        Ok(Self { ids, addresses })
    }

    /// Node id of an address, if it is part of this epoch
    pub fn id_of(&self, address: &Address) -> Option<NodeId> {
        self.ids.get(address).copied()
    }

    /// Address owning a node id
    pub fn address_of(&self, id: NodeId) -> &Address {
        &self.addresses[id as usize]
    }

    /// Indexed addresses in id order
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Number of indexed accounts
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// True if the index is empty (never constructed this way)
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// True if the address was part of this epoch
    pub fn contains(&self, address: &Address) -> bool {
        self.ids.contains_key(address)
    }
}

/// Age of an address given the previous epoch's ages: one more epoch of
/// consecutive activity, or zero for a (re-)entrant.
pub fn age_of(address: &Address, previous: &BTreeMap<Address, NodeAge>) -> NodeAge {
    previous.get(address).map(|age| age + 1).unwrap_or(0)
}

/// Ages for every account in the new epoch's index. Accounts absent from
/// the previous epoch start over at zero.
pub fn next_ages(
    index: &NodeIndex,
    previous: &BTreeMap<Address, NodeAge>,
) -> BTreeMap<Address, NodeAge> {
    index
        .addresses()
        .iter()
        .map(|a| (*a, age_of(a, previous)))
        .collect()
}
