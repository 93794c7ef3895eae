//! # Vesta Common
//!
//! Common utilities, types, and standardized patterns for the Vesta
//! proof-of-importance engine. This crate serves as the single source of
//! truth for shared functionality across the Vesta workspace, preventing
//! code duplication and circular dependencies.
//!
//! ## Modules
//!
//! - **types**: Common type definitions and protocol constants
//! - **fixed**: Deterministic scaled-integer arithmetic for consensus math
//! - **error**: Standardized error taxonomy
//! - **serialization**: Standardized data encoding/decoding patterns
//!
//! ## Example Usage
//!
//! ```rust
//! use vesta_common::prelude::*;
//!
//! let alice = derive_address(b"alice");
//! let half: ScoreRaw = fixed::from_ratio(1, 2);
//! assert_eq!(half, SCORE_SCALE / 2);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod fixed;
pub mod serialization;
pub mod types;

/// Re-export commonly used types and traits
pub mod prelude {
    pub use crate::error::{VestaError, VestaResult};
    pub use crate::fixed::{self, ScoreRaw, SCORE_SCALE};
    pub use crate::serialization::{EncodingType, VestaSerialize};
    pub use crate::types::{derive_address, Address, Amount, BlockHeight, NodeAge, NodeId};

    // Re-export essential external crates
    pub use anyhow::Result;
}

// Version and constants
/// Vesta common crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol version for snapshot compatibility
pub const PROTOCOL_VERSION: u32 = 1;
