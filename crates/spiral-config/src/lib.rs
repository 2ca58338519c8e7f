// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Shared runtime configuration for the macro-scale search crates.

pub mod search;
pub mod tracing;

pub use search::{config, configure, SearchConfig};
pub use tracing::init_tracing;
