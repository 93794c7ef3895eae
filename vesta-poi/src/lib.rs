//! # Vesta POI
//!
//! The proof-of-importance engine: computes, per account and per
//! recalculation height, a deterministic importance score used for block
//! producer selection and consensus weighting.
//!
//! ## Architecture Overview
//!
//! A recalculation pass wires together five stages:
//!
//! 1. [`NodeIndex`] - maps the active address set to dense node ids in a
//!    canonical order every node reproduces independently
//! 2. [`TransferGraph`] - the weighted, netted transfer graph over the
//!    lookback window
//! 3. [`rank`] - fixed-point power iteration plus cluster and maturity
//!    damping, producing the structural graph score
//! 4. [`stake`] - vested-balance share of total vested stake
//! 5. [`PoiImportanceCalculator`] - combines the two scores with the
//!    protocol weights, normalizes, and publishes atomically through the
//!    account store
//!
//! Every stage is integer-only arithmetic: two nodes running the same pass
//! on the same snapshot produce bit-identical importance values.
//!
//! ## Example Usage
//!
//! ```
//! use std::collections::BTreeSet;
//! use vesta_common::types::derive_address;
//! use vesta_poi::{new_calculator, CalculatorKind, PoiOptions};
//! use vesta_state::AccountStore;
//!
//! # fn example() -> vesta_common::error::VestaResult<()> {
//! let mut store = AccountStore::new();
//! let alice = derive_address(b"alice");
//! store.credit_fully_vested(&alice, 1, 1_000_000)?;
//!
//! let mut calculator = new_calculator(CalculatorKind::Poi, PoiOptions::default())?;
//! let active: BTreeSet<_> = [alice].into_iter().collect();
//! calculator.recalculate(359, &mut store, &active, &Vec::new())?;
//! assert!(store.current_importance(&alice).is_some());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod calculator;
pub mod graph;
pub mod index;
pub mod options;
pub mod rank;
pub mod stake;

pub use calculator::{
    new_calculator, CalculatorKind, ImportanceCalculator, PoiImportanceCalculator,
    PosImportanceCalculator,
};
pub use graph::{HeightWindow, Transfer, TransferGraph, TransferSource};
pub use index::NodeIndex;
pub use options::PoiOptions;

use vesta_common::types::protocol::IMPORTANCE_RECALC_INTERVAL;
use vesta_common::types::BlockHeight;

/// True if `height` is a recalculation checkpoint.
///
/// Importance is recalculated only at fixed height intervals; block
/// validation and harvesting read the scores published at the most recent
/// checkpoint in between.
pub fn is_recalc_height(height: BlockHeight) -> bool {
    height > 0 && height % IMPORTANCE_RECALC_INTERVAL == 0
}
