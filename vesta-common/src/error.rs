//vesta-common/src/error.rs
//! Standardized error types for all Vesta components

use crate::types::{Amount, BlockHeight};
use thiserror::Error;

/// Standard result type used throughout Vesta
pub type VestaResult<T> = std::result::Result<T, VestaError>;

/// Comprehensive error type for all Vesta operations
///
/// The first three variants form the consensus-facing taxonomy: a balance
/// write that would violate the ledger invariant, a recalculation height with
/// no scoreable accounts, and a snapshot with no vested stake. Everything
/// else is operational.
#[derive(Error, Debug)]
pub enum VestaError {
    /// A debit would drive the cumulative balance below zero.
    /// Fatal only to the triggering write; the ledger is left untouched.
    #[error("invalid balance change at height {height}: debit {requested} exceeds balance {available}")]
    InvalidBalance {
        /// Height of the rejected entry
        height: BlockHeight,
        /// Debited amount
        requested: Amount,
        /// Balance available before the write
        available: Amount,
    },

    /// No accounts are eligible for scoring at this height.
    /// The caller skips the recalculation and retries at the next checkpoint.
    #[error("no accounts eligible for importance scoring at height {height}")]
    EmptyActiveSet {
        /// Height of the skipped recalculation
        height: BlockHeight,
    },

    /// Cumulative vested stake is zero. Handled internally by defaulting all
    /// stake scores to zero; exposed here for callers that query stake alone.
    #[error("cumulative vested stake is zero at height {height}")]
    ZeroStake {
        /// Height of the snapshot
        height: BlockHeight,
    },

    // Serialization errors
    #[error("serialization error: {0}")]
    Serialization(String),

    // State management errors
    #[error("state error: {0}")]
    State(String),

    // Configuration errors
    #[error("config error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("internal error: {0}")]
    Internal(String),

    // External library errors
    #[error("external error: {0}")]
    External(#[from] anyhow::Error),
}

impl VestaError {
    /// Create a new state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a new serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

/// Convenience macro for creating VestaError instances
#[macro_export]
macro_rules! vesta_error {
    ($variant:ident, $($arg:tt)*) => {
        $crate::error::VestaError::$variant(format!($($arg)*))
    };
}

/// Convenience macro for returning early with a VestaError
#[macro_export]
macro_rules! vesta_bail {
    ($variant:ident, $($arg:tt)*) => {
        return Err($crate::vesta_error!($variant, $($arg)*))
    };
}
