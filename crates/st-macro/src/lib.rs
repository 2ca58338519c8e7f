// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Spatial coarse-graining of binary networks.
//!
//! A network of `N` binary nodes is described by a transition probability
//! matrix (TPM). This crate converts between the state-by-node and
//! state-by-state TPM forms, validates network inputs, enumerates every way to
//! group nodes into macro-elements (set partitions) together with every way to
//! group their micro-states into macro-states (groupings), and searches that
//! space for the coarse-graining with the largest integrated information as
//! reported by an injected [`PhiOracle`].

pub mod convert;
pub mod error;
pub mod grouping;
pub mod mapping;
pub mod network;
pub mod oracle;
pub mod partition;
pub mod search;
pub mod state;
pub mod validate;

pub use error::{PartitionError, SearchError, ValidationError};
pub use grouping::{all_groupings, groupings, Grouping, Groupings};
pub use mapping::{make_macro_tpm, make_mapping};
pub use network::Network;
pub use oracle::{CandidateSystem, PhiOracle};
pub use partition::{all_partitions, partitions, Partition, SetPartitions};
pub use search::{coarse_grain, emergence, CoarseGrain, MacroNetwork, MacroSearch};

/// Numerical tolerance shared by validation and the search tie rule.
pub const EPSILON: f64 = spiral_config::search::DEFAULT_EPSILON;
