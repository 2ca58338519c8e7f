// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Brute-force search for the coarse-graining with the largest phi.
//!
//! Candidates are visited in a fixed order: node subsets size-major and
//! lexicographic, then partitions in table order, then groupings in product
//! order. A candidate only replaces the incumbent when it beats it by strictly
//! more than the configured epsilon, so among near-ties the first one visited
//! wins.

use crate::error::SearchError;
use crate::grouping::{groupings, Grouping};
use crate::network::Network;
use crate::oracle::{check_nodes, PhiOracle};
use crate::partition::{partitions, Partition};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Best candidate found for a fixed node subset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoarseGrain {
    pub phi: f64,
    pub partition: Partition,
    pub grouping: Grouping,
}

impl CoarseGrain {
    /// Result for a subset with no candidates: phi of negative infinity and
    /// empty partition and grouping.
    pub fn degenerate() -> Self {
        Self {
            phi: f64::NEG_INFINITY,
            partition: Partition::default(),
            grouping: Grouping::default(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.phi == f64::NEG_INFINITY
    }
}

/// Outcome of [`emergence`]: the winning macro system of a network.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MacroNetwork<'n> {
    #[serde(skip)]
    network: &'n Network,
    size: usize,
    system: Vec<usize>,
    phi: f64,
    micro_phi: f64,
    partition: Partition,
    grouping: Grouping,
    emergence: f64,
}

impl<'n> MacroNetwork<'n> {
    fn new(network: &'n Network, system: Vec<usize>, winner: CoarseGrain, micro_phi: f64) -> Self {
        Self {
            network,
            size: network.size(),
            system,
            phi: winner.phi,
            micro_phi,
            partition: winner.partition,
            grouping: winner.grouping,
            emergence: winner.phi - micro_phi,
        }
    }

    /// Record for a network where no subset produced a candidate.
    fn identity(network: &'n Network, micro_phi: f64) -> Self {
        Self {
            network,
            size: network.size(),
            system: Vec::new(),
            phi: micro_phi,
            micro_phi,
            partition: Partition::default(),
            grouping: Grouping::default(),
            emergence: 0.0,
        }
    }

    pub fn network(&self) -> &'n Network {
        self.network
    }

    /// Number of nodes of the underlying network.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn system(&self) -> &[usize] {
        &self.system
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn micro_phi(&self) -> f64 {
        self.micro_phi
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    /// `phi - micro_phi`.
    pub fn emergence(&self) -> f64 {
        self.emergence
    }
}

/// Every subset of `{0, .., n - 1}`: by size, then lexicographically.
#[derive(Clone, Debug)]
pub struct PowerSet {
    n: usize,
    next: Option<Vec<usize>>,
}

impl PowerSet {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            next: Some(Vec::new()),
        }
    }

    fn successor(&self, subset: &[usize]) -> Option<Vec<usize>> {
        let k = subset.len();
        // Rightmost slot that can still move right.
        if let Some(slot) = (0..k).rev().find(|&i| subset[i] < self.n - k + i) {
            let mut next = subset.to_vec();
            next[slot] += 1;
            for i in slot + 1..k {
                next[i] = next[i - 1] + 1;
            }
            return Some(next);
        }
        (k < self.n).then(|| (0..=k).collect())
    }
}

impl Iterator for PowerSet {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let subset = self.next.take()?;
        self.next = self.successor(&subset);
        Some(subset)
    }
}

/// Search driver bound to an oracle and explicit settings.
#[derive(Debug)]
pub struct MacroSearch<'o, O> {
    oracle: &'o O,
    epsilon: f64,
    parallel: bool,
}

impl<'o, O> Clone for MacroSearch<'o, O> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'o, O> Copy for MacroSearch<'o, O> {}

impl<'o, O: PhiOracle> MacroSearch<'o, O> {
    /// Uses the process-wide [`spiral_config::search::config`] snapshot.
    pub fn new(oracle: &'o O) -> Self {
        let cfg = spiral_config::search::config();
        Self {
            oracle,
            epsilon: cfg.epsilon,
            parallel: cfg.parallel,
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.max(0.0);
        self
    }

    /// Requests concurrent evaluation of node subsets. Without the `parallel`
    /// feature the search stays sequential.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Best (partition, grouping) pair for the nodes `indices` of `network`.
    ///
    /// An empty `indices` yields [`CoarseGrain::degenerate`] without
    /// consulting the oracle.
    pub fn coarse_grain(
        &self,
        indices: &[usize],
        network: &Network,
    ) -> Result<CoarseGrain, SearchError<O::Error>> {
        let mut best = CoarseGrain::degenerate();
        if indices.is_empty() {
            return Ok(best);
        }
        check_nodes(indices, network.size())?;

        for partition in partitions(indices.len())? {
            let partition = partition.map_onto(indices);
            for grouping in groupings(&partition)? {
                let candidate = self
                    .oracle
                    .build_candidate(indices, network, &partition, &grouping)
                    .map_err(SearchError::Oracle)?;
                let phi = self.oracle.phi(&candidate).map_err(SearchError::Oracle)?;
                trace!(?indices, ?partition, ?grouping, phi, "evaluated candidate");
                if phi - best.phi > self.epsilon {
                    debug!(?indices, ?partition, ?grouping, phi, previous = best.phi, "new incumbent");
                    best = CoarseGrain {
                        phi,
                        partition: partition.clone(),
                        grouping,
                    };
                }
            }
        }
        Ok(best)
    }

    /// Searches every node subset sequentially.
    pub fn emergence_sequential<'n>(
        &self,
        network: &'n Network,
    ) -> Result<MacroNetwork<'n>, SearchError<O::Error>> {
        let micro_phi = self
            .oracle
            .main_complex_phi(network)
            .map_err(SearchError::Oracle)?;
        let results = PowerSet::new(network.size()).map(|system| -> Result<_, SearchError<O::Error>> {
            let grain = self.coarse_grain(&system, network)?;
            Ok((system, grain))
        });
        self.select(network, micro_phi, results)
    }

    fn select<'n, I>(
        &self,
        network: &'n Network,
        micro_phi: f64,
        results: I,
    ) -> Result<MacroNetwork<'n>, SearchError<O::Error>>
    where
        I: IntoIterator<Item = Result<(Vec<usize>, CoarseGrain), SearchError<O::Error>>>,
    {
        let mut best: Option<(Vec<usize>, CoarseGrain)> = None;
        let mut best_phi = f64::NEG_INFINITY;
        for result in results {
            let (system, grain) = result?;
            if grain.phi - best_phi > self.epsilon {
                debug!(?system, phi = grain.phi, previous = best_phi, "new best system");
                best_phi = grain.phi;
                best = Some((system, grain));
            }
        }

        let record = match best {
            Some((system, grain)) => MacroNetwork::new(network, system, grain, micro_phi),
            None => MacroNetwork::identity(network, micro_phi),
        };
        info!(
            system = ?record.system(),
            phi = record.phi(),
            micro_phi,
            emergence = record.emergence(),
            "coarse-graining search finished"
        );
        Ok(record)
    }
}

#[cfg(not(feature = "parallel"))]
impl<'o, O: PhiOracle> MacroSearch<'o, O> {
    /// Runs the full search over `network` and returns the winning macro
    /// system together with its emergence over the micro scale.
    pub fn emergence<'n>(
        &self,
        network: &'n Network,
    ) -> Result<MacroNetwork<'n>, SearchError<O::Error>> {
        self.emergence_sequential(network)
    }
}

#[cfg(feature = "parallel")]
impl<'o, O> MacroSearch<'o, O>
where
    O: PhiOracle + Sync,
    O::Error: Send,
{
    /// Runs the full search over `network` and returns the winning macro
    /// system together with its emergence over the micro scale.
    pub fn emergence<'n>(
        &self,
        network: &'n Network,
    ) -> Result<MacroNetwork<'n>, SearchError<O::Error>> {
        if self.parallel {
            self.emergence_parallel(network)
        } else {
            self.emergence_sequential(network)
        }
    }

    /// Evaluates node subsets on the rayon pool. Results are reduced in
    /// subset order, so the outcome matches [`Self::emergence_sequential`].
    pub fn emergence_parallel<'n>(
        &self,
        network: &'n Network,
    ) -> Result<MacroNetwork<'n>, SearchError<O::Error>> {
        use rayon::prelude::*;

        let micro_phi = self
            .oracle
            .main_complex_phi(network)
            .map_err(SearchError::Oracle)?;
        let systems: Vec<Vec<usize>> = PowerSet::new(network.size()).collect();
        let results: Vec<_> = systems
            .into_par_iter()
            .map(|system| -> Result<_, SearchError<O::Error>> {
                let grain = self.coarse_grain(&system, network)?;
                Ok((system, grain))
            })
            .collect();
        self.select(network, micro_phi, results)
    }
}

/// [`MacroSearch::coarse_grain`] with the process-wide configuration.
pub fn coarse_grain<O: PhiOracle>(
    indices: &[usize],
    network: &Network,
    oracle: &O,
) -> Result<CoarseGrain, SearchError<O::Error>> {
    MacroSearch::new(oracle).coarse_grain(indices, network)
}

/// [`MacroSearch::emergence`] with the process-wide configuration.
#[cfg(not(feature = "parallel"))]
pub fn emergence<'n, O: PhiOracle>(
    network: &'n Network,
    oracle: &O,
) -> Result<MacroNetwork<'n>, SearchError<O::Error>> {
    MacroSearch::new(oracle).emergence(network)
}

/// [`MacroSearch::emergence`] with the process-wide configuration.
#[cfg(feature = "parallel")]
pub fn emergence<'n, O>(
    network: &'n Network,
    oracle: &O,
) -> Result<MacroNetwork<'n>, SearchError<O::Error>>
where
    O: PhiOracle + Sync,
    O::Error: Send,
{
    MacroSearch::new(oracle).emergence(network)
}
