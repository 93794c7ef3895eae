//! Importance calculation orchestration
//!
//! [`PoiImportanceCalculator`] runs one full recalculation pass: node index,
//! transfer graph, graph scores and stake scores, then combines the two
//! into normalized importance values and publishes them through the account
//! store's atomic commit. [`PosImportanceCalculator`] is the stake-only
//! variant for configurations with graph analysis disabled; both are
//! selected once at node configuration time behind the
//! [`ImportanceCalculator`] trait.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use tracing::{debug, info};
use vesta_common::prelude::*;
use vesta_state::{AccountImportance, AccountStore, ImportanceResults};

use crate::graph::{HeightWindow, TransferGraph, TransferSource};
use crate::index::{next_ages, NodeIndex};
use crate::options::PoiOptions;
use crate::{rank, stake};

/// A pluggable importance algorithm, chosen once at node configuration time
pub trait ImportanceCalculator {
    /// Runs one recalculation pass at `height` and publishes the results.
    ///
    /// The active set and the transfer window come from the external
    /// account/transaction store; this subsystem performs no I/O. The pass
    /// either fully commits or leaves the store untouched.
    fn recalculate(
        &mut self,
        height: BlockHeight,
        store: &mut AccountStore,
        active: &BTreeSet<Address>,
        transfers: &dyn TransferSource,
    ) -> VestaResult<()>;
}

/// Importance algorithm selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalculatorKind {
    /// Full proof-of-importance: vested stake plus transfer-graph analysis
    Poi,
    /// Stake-only fallback: vested-balance share, no graph
    Pos,
}

/// Creates the configured importance calculator
pub fn new_calculator(
    kind: CalculatorKind,
    options: PoiOptions,
) -> VestaResult<Box<dyn ImportanceCalculator + Send>> {
    options.validate()?;
    Ok(match kind {
        CalculatorKind::Poi => Box::new(PoiImportanceCalculator::new(options)),
        CalculatorKind::Pos => Box::new(PosImportanceCalculator::new(options)),
    })
}

/// The full proof-of-importance calculator
pub struct PoiImportanceCalculator {
    options: PoiOptions,
    // ages of the previous epoch's active set; rebuilt on every commit
    prev_ages: BTreeMap<Address, NodeAge>,
}

impl PoiImportanceCalculator {
    /// Creates a calculator with the given options
    pub fn new(options: PoiOptions) -> Self {
        Self {
            options,
            prev_ages: BTreeMap::new(),
        }
    }
}

impl ImportanceCalculator for PoiImportanceCalculator {
    fn recalculate(
        &mut self,
        height: BlockHeight,
        store: &mut AccountStore,
        active: &BTreeSet<Address>,
        transfers: &dyn TransferSource,
    ) -> VestaResult<()> {
        let started = Instant::now();

        let index = NodeIndex::build(height, active)?;
        let snapshot = store.snapshot(height, active);
        debug_assert_eq!(snapshot.addresses, index.addresses());

        let window = HeightWindow::ending_at(height, self.options.lookback_blocks);
        let graph = TransferGraph::build(window, transfers, &index, self.options.min_outlink_weight);

        let ages_by_address = next_ages(&index, &self.prev_ages);
        let ages: Vec<NodeAge> = index
            .addresses()
            .iter()
            .map(|a| ages_by_address[a])
            .collect();

        let graph_vec = rank::graph_scores(&graph, &ages, &self.options);
        let stake_vec = stake::stake_scores(&snapshot);
        let combined = combine(&stake_vec, &graph_vec, &self.options);

        let entries = index
            .addresses()
            .iter()
            .enumerate()
            .map(|(i, address)| {
                (
                    *address,
                    AccountImportance {
                        height,
                        importance: combined[i],
                        graph_score: graph_vec[i],
                    },
                )
            })
            .collect();

        let results = ImportanceResults {
            generation: snapshot.generation,
            height,
            retention_depth: self.options.retention_depth,
            entries,
        };

        if store.commit(&results) {
            self.prev_ages = ages_by_address;
            info!(
                height,
                accounts = index.len(),
                edges = graph.edge_count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "importance recalculated"
            );
        }
        Ok(())
    }
}

/// Stake-only importance calculator; graph scores are identically zero
pub struct PosImportanceCalculator {
    options: PoiOptions,
}

impl PosImportanceCalculator {
    /// Creates a calculator with the given options
    pub fn new(options: PoiOptions) -> Self {
        Self { options }
    }
}

impl ImportanceCalculator for PosImportanceCalculator {
    fn recalculate(
        &mut self,
        height: BlockHeight,
        store: &mut AccountStore,
        active: &BTreeSet<Address>,
        _transfers: &dyn TransferSource,
    ) -> VestaResult<()> {
        let index = NodeIndex::build(height, active)?;
        let snapshot = store.snapshot(height, active);
        let mut scores = stake::stake_scores(&snapshot);
        fixed::normalize(&mut scores);

        let entries = index
            .addresses()
            .iter()
            .enumerate()
            .map(|(i, address)| {
                (
                    *address,
                    AccountImportance {
                        height,
                        importance: scores[i],
                        graph_score: 0,
                    },
                )
            })
            .collect();

        let results = ImportanceResults {
            generation: snapshot.generation,
            height,
            retention_depth: self.options.retention_depth,
            entries,
        };
        if store.commit(&results) {
            debug!(height, accounts = index.len(), "stake-only importance recalculated");
        }
        Ok(())
    }
}

// Fixed-weight linear combination of the two score vectors, normalized so
// the active-set importance sums to SCORE_SCALE.
fn combine(stake: &[ScoreRaw], graph: &[ScoreRaw], options: &PoiOptions) -> Vec<ScoreRaw> {
    debug_assert_eq!(stake.len(), graph.len());
    let mut combined: Vec<ScoreRaw> = stake
        .iter()
        .zip(graph.iter())
        .map(|(&s, &g)| fixed::scale(s, options.stake_weight) + fixed::scale(g, options.graph_weight))
        .collect();
    fixed::normalize(&mut combined);
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Transfer;
    use once_cell::sync::OnceCell;
    use vesta_common::types::derive_address;

    static TRACING: OnceCell<()> = OnceCell::new();

    fn init_tracing() {
        TRACING.get_or_init(|| {
            let _ = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .try_init();
        });
    }

    fn options() -> PoiOptions {
        PoiOptions {
            min_outlink_weight: 0,
            retention_depth: 8,
            ..Default::default()
        }
    }

    fn transfer(height: BlockHeight, from: &Address, to: &Address, amount: Amount) -> Transfer {
        Transfer {
            height,
            sender: *from,
            recipient: *to,
            amount,
        }
    }

    // Seeds a store with fully vested balances at height 1.
    fn seeded_store(balances: &[(&[u8], Amount)]) -> (AccountStore, Vec<Address>) {
        let mut store = AccountStore::new();
        let mut addresses = Vec::new();
        for &(name, amount) in balances {
            let addr = derive_address(name);
            store.credit_fully_vested(&addr, 1, amount).unwrap();
            addresses.push(addr);
        }
        (store, addresses)
    }

    fn active_of(addresses: &[Address]) -> BTreeSet<Address> {
        addresses.iter().copied().collect()
    }

    #[test]
    fn test_empty_active_set_skips_the_pass() {
        let mut calc = PoiImportanceCalculator::new(options());
        let mut store = AccountStore::new();
        let err = calc
            .recalculate(359, &mut store, &BTreeSet::new(), &Vec::new())
            .unwrap_err();
        assert!(matches!(err, VestaError::EmptyActiveSet { height: 359 }));
    }

    #[test]
    fn test_stake_ordering_preserved_with_no_transfers() {
        init_tracing();
        let (mut store, addrs) = seeded_store(&[(b"a", 100), (b"b", 100), (b"c", 800)]);
        let active = active_of(&addrs);
        let mut calc = PoiImportanceCalculator::new(options());
        calc.recalculate(1000, &mut store, &active, &Vec::new())
            .unwrap();

        let a = store.current_importance(&addrs[0]).unwrap();
        let b = store.current_importance(&addrs[1]).unwrap();
        let c = store.current_importance(&addrs[2]).unwrap();
        // equal stake, equal graph score => equal importance
        assert_eq!(a.importance, b.importance);
        assert!(c.importance > a.importance);
        // no edges: graph scores are uniform
        assert_eq!(a.graph_score, b.graph_score);
        assert_eq!(b.graph_score, c.graph_score);

        let sum = a.importance + b.importance + c.importance;
        assert!(SCORE_SCALE.abs_diff(sum) <= 3);
    }

    #[test]
    fn test_importance_sums_to_one_within_tolerance() {
        let (mut store, addrs) = seeded_store(&[
            (b"a", 13),
            (b"b", 7_777),
            (b"c", 123_456),
            (b"d", 1),
            (b"e", 999_999_999),
        ]);
        let active = active_of(&addrs);
        let transfers = vec![
            transfer(900, &addrs[0], &addrs[1], 5),
            transfer(901, &addrs[1], &addrs[2], 1_000),
            transfer(902, &addrs[4], &addrs[0], 77),
        ];
        let mut calc = PoiImportanceCalculator::new(options());
        calc.recalculate(1000, &mut store, &active, &transfers)
            .unwrap();

        let sum: u64 = addrs
            .iter()
            .map(|a| store.current_importance(a).unwrap().importance)
            .sum();
        assert!(SCORE_SCALE.abs_diff(sum) <= addrs.len() as u64);
    }

    #[test]
    fn test_recalculation_is_byte_identical_across_runs() {
        let run = || {
            let (mut store, addrs) = seeded_store(&[
                (b"a", 1_000_000),
                (b"b", 2_000_000),
                (b"c", 3_000_000),
                (b"d", 4_000_000),
            ]);
            let active = active_of(&addrs);
            let transfers = vec![
                transfer(800, &addrs[0], &addrs[1], 250_000),
                transfer(850, &addrs[1], &addrs[2], 125_000),
                transfer(900, &addrs[2], &addrs[3], 62_500),
                transfer(950, &addrs[3], &addrs[0], 31_250),
            ];
            let mut calc = PoiImportanceCalculator::new(options());
            for height in [359, 718, 1077] {
                calc.recalculate(height, &mut store, &active, &transfers)
                    .unwrap();
            }
            addrs
                .iter()
                .map(|a| store.current_importance(a).unwrap().encode().unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_zero_stake_pass_still_commits() {
        // accounts exist but nothing has vested yet
        let mut store = AccountStore::new();
        let a = derive_address(b"a");
        let b = derive_address(b"b");
        store.credit(&a, 999, 1_000).unwrap();
        store.credit(&b, 999, 1_000).unwrap();
        let active: BTreeSet<Address> = [a, b].into_iter().collect();

        let mut calc = PoiImportanceCalculator::new(options());
        calc.recalculate(1000, &mut store, &active, &Vec::new())
            .unwrap();

        // graph part alone carries the importance; the pass is published
        let ia = store.current_importance(&a).unwrap();
        let ib = store.current_importance(&b).unwrap();
        assert_eq!(ia.importance, ib.importance);
        assert!(ia.importance > 0);
    }

    #[test]
    fn test_isolated_pair_scores_below_connected_peer() {
        init_tracing();
        // six equally funded accounts: a ring of four and a closed pair
        let (mut store, addrs) = seeded_store(&[
            (b"a", 1_000_000),
            (b"b", 1_000_000),
            (b"c", 1_000_000),
            (b"d", 1_000_000),
            (b"e", 1_000_000),
            (b"f", 1_000_000),
        ]);
        let active = active_of(&addrs);
        // addrs[0..=3] form a ring with a chord; addrs[4] and addrs[5]
        // only ever pay each other
        let transfers = vec![
            transfer(900, &addrs[0], &addrs[1], 10_000),
            transfer(901, &addrs[1], &addrs[2], 10_000),
            transfer(902, &addrs[2], &addrs[3], 10_000),
            transfer(903, &addrs[3], &addrs[0], 10_000),
            transfer(904, &addrs[0], &addrs[2], 10_000),
            transfer(905, &addrs[4], &addrs[5], 10_000),
            transfer(906, &addrs[5], &addrs[4], 10_000),
        ];

        let mut calc = PoiImportanceCalculator::new(options());
        // three epochs so every account clears the maturity threshold
        for height in [1000, 1359, 1718] {
            calc.recalculate(height, &mut store, &active, &transfers)
                .unwrap();
        }

        let pair = store.current_importance(&addrs[4]).unwrap().importance;
        let ring = store.current_importance(&addrs[1]).unwrap().importance;
        assert!(pair < ring);
    }

    #[test]
    fn test_new_isolated_pair_is_floored_regardless_of_amount() {
        let (mut store, addrs) = seeded_store(&[
            (b"a", 1_000_000),
            (b"b", 1_000_000),
            (b"c", 1_000_000),
        ]);
        let established = active_of(&addrs);
        let mut calc = PoiImportanceCalculator::new(options());
        // three epochs of history for the established accounts
        for height in [359, 718, 1077] {
            calc.recalculate(height, &mut store, &established, &Vec::new())
                .unwrap();
        }

        // d and e appear this epoch, moving huge sums only between each other
        let d = derive_address(b"d");
        let e = derive_address(b"e");
        store.credit_fully_vested(&d, 1100, 500_000_000).unwrap();
        store.credit_fully_vested(&e, 1100, 500_000_000).unwrap();
        let mut active = established.clone();
        active.insert(d);
        active.insert(e);
        let transfers = vec![
            transfer(1101, &d, &e, 400_000_000),
            transfer(1102, &e, &d, 400_000_000),
        ];
        calc.recalculate(1436, &mut store, &active, &transfers)
            .unwrap();

        let opts = options();
        assert!(store.current_importance(&d).unwrap().graph_score <= opts.new_node_floor);
        assert!(store.current_importance(&e).unwrap().graph_score <= opts.new_node_floor);
        assert!(store.current_importance(&addrs[0]).unwrap().graph_score > opts.new_node_floor);
    }

    #[test]
    fn test_history_grows_and_prunes_across_passes() {
        let (mut store, addrs) = seeded_store(&[(b"a", 100), (b"b", 900)]);
        let active = active_of(&addrs);
        let mut calc = PoiImportanceCalculator::new(PoiOptions {
            retention_depth: 2,
            ..options()
        });
        for pass in 1..=4u64 {
            calc.recalculate(pass * 359, &mut store, &active, &Vec::new())
                .unwrap();
        }
        let history = store.historical_importances(&addrs[0]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap().height, 4 * 359);
        assert_eq!(history.first().unwrap().height, 3 * 359);
    }

    #[test]
    fn test_pos_calculator_uses_stake_only() {
        let (mut store, addrs) = seeded_store(&[(b"a", 100), (b"b", 100), (b"c", 800)]);
        let active = active_of(&addrs);
        let mut calc = new_calculator(CalculatorKind::Pos, options()).unwrap();
        calc.recalculate(1000, &mut store, &active, &Vec::new())
            .unwrap();

        let a = store.current_importance(&addrs[0]).unwrap();
        let c = store.current_importance(&addrs[2]).unwrap();
        assert_eq!(a.importance, SCORE_SCALE / 10);
        assert_eq!(c.importance, SCORE_SCALE * 8 / 10);
        assert_eq!(a.graph_score, 0);
    }

    #[test]
    fn test_invalid_options_rejected_at_construction() {
        let bad = PoiOptions {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(new_calculator(CalculatorKind::Poi, bad).is_err());
    }
}
