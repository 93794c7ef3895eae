//! Weighted transfer graph over the node index
//!
//! Built once per epoch from the transactions in the lookback window and
//! immutable afterwards. Edge weight is the cumulative transferred amount
//! per ordered (sender, recipient) pair, netted against the reverse
//! direction: reciprocal wash transfers between two accounts cancel out and
//! cannot manufacture graph structure. Self-transfers and transfers with an
//! endpoint outside the active set never become edges, and neither do
//! netted edges below the minimum outlink weight.

use std::collections::BTreeMap;

use tracing::debug;
use vesta_common::prelude::*;

use crate::index::NodeIndex;

/// One observed transfer feeding the graph. Multi-output transactions are
/// supplied pre-split, one record per recipient with that recipient's share.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// Block height the transfer was confirmed at
    pub height: BlockHeight,
    /// Sending address
    pub sender: Address,
    /// Receiving address
    pub recipient: Address,
    /// Transferred amount
    pub amount: Amount,
}

/// Inclusive block-height window feeding the graph
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeightWindow {
    /// First height of the window
    pub start: BlockHeight,
    /// Last height of the window
    pub stop: BlockHeight,
}

impl HeightWindow {
    /// The lookback window ending at `height` with the given length
    pub fn ending_at(height: BlockHeight, lookback: u64) -> Self {
        Self {
            start: height.saturating_sub(lookback.saturating_sub(1)).max(1),
            stop: height,
        }
    }

    /// True if the height falls inside the window
    pub fn contains(&self, height: BlockHeight) -> bool {
        height >= self.start && height <= self.stop
    }
}

/// Read-only iterator over transfers in a bounded window; implemented by
/// the external block/transaction store.
pub trait TransferSource {
    /// All transfers confirmed within the window, in chain order
    fn transfers_in(&self, window: HeightWindow) -> Vec<Transfer>;
}

impl TransferSource for Vec<Transfer> {
    fn transfers_in(&self, window: HeightWindow) -> Vec<Transfer> {
        self.iter()
            .filter(|t| window.contains(t.height))
            .copied()
            .collect()
    }
}

/// Immutable weighted directed multigraph for one epoch
#[derive(Clone, Debug)]
pub struct TransferGraph {
    outgoing: Vec<Vec<(NodeId, Amount)>>,
    out_sums: Vec<u128>,
    edge_count: usize,
}

impl TransferGraph {
    /// Builds the graph from the transfers inside the window.
    ///
    /// Weights accumulate per ordered node pair, then each pair is netted
    /// against its reverse direction; only the surplus direction keeps an
    /// edge. After netting, edges lighter than `min_outlink_weight` are
    /// dropped so dust transfers cannot shape the topology.
    pub fn build(
        window: HeightWindow,
        source: &dyn TransferSource,
        index: &NodeIndex,
        min_outlink_weight: Amount,
    ) -> Self {
        let mut weights: BTreeMap<(NodeId, NodeId), u128> = BTreeMap::new();
        let mut observed = 0usize;
        for transfer in source.transfers_in(window) {
            observed += 1;
            if transfer.sender == transfer.recipient || transfer.amount == 0 {
                continue;
            }
            let (Some(src), Some(dst)) = (
                index.id_of(&transfer.sender),
                index.id_of(&transfer.recipient),
            ) else {
                // endpoint outside the active set; pruned accounts do not
                // participate in the graph
                continue;
            };
            *weights.entry((src, dst)).or_insert(0) += transfer.amount as u128;
        }

        let n = index.len();
        let mut outgoing: Vec<Vec<(NodeId, Amount)>> = vec![Vec::new(); n];
        let mut edge_count = 0usize;
        for (&(src, dst), &weight) in &weights {
            // net against the reverse direction; only the surplus survives
            let reverse = weights.get(&(dst, src)).copied().unwrap_or(0);
            if weight <= reverse {
                continue;
            }
            let net = (weight - reverse).min(Amount::MAX as u128) as Amount;
            if net < min_outlink_weight.max(1) {
                continue;
            }
            outgoing[src as usize].push((dst, net));
            edge_count += 1;
        }

        let out_sums = outgoing
            .iter()
            .map(|edges| edges.iter().map(|&(_, w)| w as u128).sum())
            .collect();

        debug!(
            nodes = n,
            edges = edge_count,
            transfers = observed,
            start = window.start,
            stop = window.stop,
            "transfer graph built"
        );

        Self {
            outgoing,
            out_sums,
            edge_count,
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    /// Number of materialized edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Outgoing edges of a node as (target, weight) pairs
    pub fn out_edges(&self, id: NodeId) -> &[(NodeId, Amount)] {
        &self.outgoing[id as usize]
    }

    /// Sum of outgoing edge weights of a node
    pub fn out_weight(&self, id: NodeId) -> u128 {
        self.out_sums[id as usize]
    }

    /// True if the node has no outgoing edges (dangling)
    pub fn is_dangling(&self, id: NodeId) -> bool {
        self.out_sums[id as usize] == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use vesta_common::types::derive_address;

    fn index_of(names: &[&[u8]]) -> NodeIndex {
        let set: BTreeSet<Address> = names.iter().map(|n| derive_address(n)).collect();
        NodeIndex::build(1, &set).unwrap()
    }

    fn transfer(height: BlockHeight, from: &[u8], to: &[u8], amount: Amount) -> Transfer {
        Transfer {
            height,
            sender: derive_address(from),
            recipient: derive_address(to),
            amount,
        }
    }

    #[test]
    fn test_window_ending_at() {
        let w = HeightWindow::ending_at(100, 30);
        assert_eq!(w, HeightWindow { start: 71, stop: 100 });
        // never reaches below the first block
        let w = HeightWindow::ending_at(10, 30);
        assert_eq!(w.start, 1);
    }

    #[test]
    fn test_weights_aggregate_and_net_per_ordered_pair() {
        let index = index_of(&[b"a", b"b"]);
        let a = derive_address(b"a");
        let b = derive_address(b"b");
        let transfers = vec![
            transfer(1, b"a", b"b", 300),
            transfer(2, b"a", b"b", 200),
            transfer(3, b"b", b"a", 100),
        ];
        let graph = TransferGraph::build(
            HeightWindow { start: 1, stop: 10 },
            &transfers,
            &index,
            0,
        );
        let a_id = index.id_of(&a).unwrap();
        let b_id = index.id_of(&b).unwrap();
        // a sent 500, received 100 back: only the 400 surplus remains
        assert_eq!(graph.out_edges(a_id), &[(b_id, 400)]);
        assert!(graph.is_dangling(b_id));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_reciprocal_wash_transfers_cancel_out() {
        let index = index_of(&[b"a", b"b"]);
        let transfers = vec![
            transfer(1, b"a", b"b", 1_000_000),
            transfer(2, b"b", b"a", 1_000_000),
        ];
        let graph = TransferGraph::build(
            HeightWindow { start: 1, stop: 10 },
            &transfers,
            &index,
            0,
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_self_transfers_and_outsiders_are_dropped() {
        let index = index_of(&[b"a", b"b"]);
        let transfers = vec![
            transfer(1, b"a", b"a", 500),
            transfer(2, b"a", b"stranger", 500),
            transfer(3, b"stranger", b"b", 500),
        ];
        let graph = TransferGraph::build(
            HeightWindow { start: 1, stop: 10 },
            &transfers,
            &index,
            0,
        );
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.is_dangling(0));
        assert!(graph.is_dangling(1));
    }

    #[test]
    fn test_transfers_outside_window_are_ignored() {
        let index = index_of(&[b"a", b"b"]);
        let transfers = vec![
            transfer(5, b"a", b"b", 100),
            transfer(50, b"a", b"b", 100),
        ];
        let graph = TransferGraph::build(
            HeightWindow { start: 10, stop: 60 },
            &transfers,
            &index,
            0,
        );
        let a_id = index.id_of(&derive_address(b"a")).unwrap();
        assert_eq!(graph.out_weight(a_id), 100);
    }

    #[test]
    fn test_light_edges_are_pruned_after_aggregation() {
        let index = index_of(&[b"a", b"b", b"c"]);
        let transfers = vec![
            // aggregates to 600, above the threshold
            transfer(1, b"a", b"b", 300),
            transfer(2, b"a", b"b", 300),
            // aggregates to 400, below it
            transfer(3, b"a", b"c", 400),
        ];
        let graph = TransferGraph::build(
            HeightWindow { start: 1, stop: 10 },
            &transfers,
            &index,
            500,
        );
        assert_eq!(graph.edge_count(), 1);
        let a_id = index.id_of(&derive_address(b"a")).unwrap();
        assert_eq!(graph.out_weight(a_id), 600);
    }
}
