// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use rand::{rngs::StdRng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Tolerance used when comparing phi values and round-tripped TPM entries.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Seed used when `SPIRAL_DETERMINISTIC_SEED` is absent.
pub const DEFAULT_SEED: u64 = 42;

/// Process-wide knobs for the coarse-graining search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// A candidate must beat the incumbent by strictly more than this margin.
    pub epsilon: f64,
    /// Evaluate candidate systems concurrently when the `parallel` feature is built.
    pub parallel: bool,
    /// Base seed used to derive per-label RNGs.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            parallel: false,
            seed: DEFAULT_SEED,
        }
    }
}

/// Errors raised while parsing the search configuration from the environment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a finite non-negative number, got {value:?}")]
    InvalidEpsilon { var: &'static str, value: String },
    #[error("{var} must be an unsigned integer, got {value:?}")]
    InvalidSeed { var: &'static str, value: String },
}

const EPSILON_VAR: &str = "SPIRAL_PHI_EPSILON";
const PARALLEL_VAR: &str = "SPIRAL_PHI_PARALLEL";
const SEED_VAR: &str = "SPIRAL_DETERMINISTIC_SEED";

impl SearchConfig {
    /// Reads the configuration, rejecting malformed values.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let epsilon = match std::env::var(EPSILON_VAR) {
            Ok(raw) => {
                let trimmed = raw.trim();
                match trimmed.parse::<f64>() {
                    Ok(value) if value.is_finite() && value >= 0.0 => value,
                    _ => {
                        return Err(ConfigError::InvalidEpsilon {
                            var: EPSILON_VAR,
                            value: raw,
                        })
                    }
                }
            }
            Err(_) => DEFAULT_EPSILON,
        };

        let parallel = std::env::var(PARALLEL_VAR)
            .ok()
            .map(|v| matches!(v.trim(), "1" | "true" | "True" | "on" | "ON"))
            .unwrap_or(false);

        let seed = match std::env::var(SEED_VAR) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidSeed {
                var: SEED_VAR,
                value: raw.clone(),
            })?,
            Err(_) => DEFAULT_SEED,
        };

        Ok(Self {
            epsilon,
            parallel,
            seed,
        })
    }

    /// Reads the configuration, falling back to defaults for malformed entries.
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_default()
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.max(0.0);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Derives a stable seed for a given label.
    pub fn seed_for<L: Hash>(&self, label: L) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        label.hash(&mut hasher);
        hasher.finish()
    }
}

static CONFIG: OnceLock<SearchConfig> = OnceLock::new();

/// Returns the lazily initialised search configuration.
pub fn config() -> &'static SearchConfig {
    CONFIG.get_or_init(SearchConfig::from_env)
}

/// Installs `cfg` unless a snapshot was already taken. Intended for tests and
/// embedding applications that configure programmatically.
pub fn configure(cfg: SearchConfig) -> &'static SearchConfig {
    CONFIG.get_or_init(|| cfg)
}

/// Returns a RNG seeded from the configured base seed and `label`.
pub fn rng_from_label(label: &str) -> StdRng {
    StdRng::seed_from_u64(config().seed_for(label))
}

/// Returns a RNG for an explicit seed, or a label-derived one when absent.
pub fn rng_from_optional(seed: Option<u64>, label: &str) -> StdRng {
    match seed {
        Some(value) => StdRng::seed_from_u64(value),
        None => rng_from_label(label),
    }
}
