// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! The integrated-information capability the search is parameterized over.
//!
//! The search never computes phi itself. Implementors decide how a candidate
//! coarse-graining is represented and how its phi is obtained; the ready-made
//! [`CandidateSystem`] view covers the common case.

use crate::convert::to_two_dimensional;
use crate::error::ValidationError;
use crate::grouping::Grouping;
use crate::mapping::{make_macro_tpm, make_mapping};
use crate::network::Network;
use crate::partition::Partition;
use crate::state::{loli_bit, state_count, state_to_loli_index};
use ndarray::Array2;

/// Source of phi values for candidate systems and the unrestricted network.
///
/// Every method must be a pure function of its inputs so that repeated or
/// concurrent searches agree.
pub trait PhiOracle {
    /// Restricted, grouped view of a network handed to [`PhiOracle::phi`].
    type Candidate<'n>;
    type Error: std::error::Error + 'static;

    /// Builds the view for nodes `indices` of `network`, coarse-grained by
    /// `output_grouping` (a partition of `indices`) and `state_grouping`.
    fn build_candidate<'n>(
        &self,
        indices: &[usize],
        network: &'n Network,
        output_grouping: &Partition,
        state_grouping: &Grouping,
    ) -> Result<Self::Candidate<'n>, Self::Error>;

    /// Non-negative integration measure of `candidate`.
    fn phi(&self, candidate: &Self::Candidate<'_>) -> Result<f64, Self::Error>;

    /// Integration measure of the network's main complex.
    fn main_complex_phi(&self, network: &Network) -> Result<f64, Self::Error>;
}

/// A read-only coarse-grained view of a subset of a network's nodes.
///
/// Each view owns copies of its grouping parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateSystem<'n> {
    network: &'n Network,
    indices: Vec<usize>,
    output_grouping: Partition,
    state_grouping: Grouping,
}

impl<'n> CandidateSystem<'n> {
    pub fn new(
        indices: &[usize],
        network: &'n Network,
        output_grouping: &Partition,
        state_grouping: &Grouping,
    ) -> Self {
        Self {
            network,
            indices: indices.to_vec(),
            output_grouping: output_grouping.clone(),
            state_grouping: state_grouping.clone(),
        }
    }

    pub fn network(&self) -> &'n Network {
        self.network
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn output_grouping(&self) -> &Partition {
        &self.output_grouping
    }

    pub fn state_grouping(&self) -> &Grouping {
        &self.state_grouping
    }

    /// The output grouping expressed in positions within `indices`.
    pub fn relative_partition(&self) -> Result<Partition, ValidationError> {
        self.output_grouping
            .iter()
            .map(|part| {
                part.iter()
                    .map(|&element| {
                        self.indices
                            .iter()
                            .position(|&node| node == element)
                            .ok_or(ValidationError::UnknownElement { element })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Partition::new)
    }

    /// Micro-state to macro-state mapping over the system's nodes.
    pub fn mapping(&self) -> Result<Vec<usize>, ValidationError> {
        make_mapping(&self.relative_partition()?, &self.state_grouping)
    }

    /// State-by-node TPM of the system's nodes, with every node outside the
    /// system held at its current state. Rows are LOLI indices over `indices`.
    pub fn micro_tpm(&self) -> Result<Array2<f64>, ValidationError> {
        check_nodes(&self.indices, self.network.size())?;
        let rows = to_two_dimensional(self.network.tpm())?;
        let mut background = self.network.current_state().to_vec();
        let size = self.indices.len();
        let mut tpm = Array2::<f64>::zeros((state_count(size), size));
        for (local, mut out) in tpm.outer_iter_mut().enumerate() {
            for (position, &node) in self.indices.iter().enumerate() {
                background[node] = u8::from(loli_bit(local, position));
            }
            let row = rows.row(state_to_loli_index(&background));
            for (position, &node) in self.indices.iter().enumerate() {
                out[position] = row[node];
            }
        }
        Ok(tpm)
    }

    /// Macro-level state-by-state TPM of the coarse-grained system.
    pub fn macro_tpm(&self) -> Result<Array2<f64>, ValidationError> {
        make_macro_tpm(&self.micro_tpm()?.into_dyn(), &self.mapping()?)
    }
}

/// Fails unless `indices` are distinct nodes of a `size`-node network.
pub(crate) fn check_nodes(indices: &[usize], size: usize) -> Result<(), ValidationError> {
    for (position, &node) in indices.iter().enumerate() {
        if node >= size {
            return Err(ValidationError::NodeOutOfRange { node, size });
        }
        if indices[..position].contains(&node) {
            return Err(ValidationError::DuplicateNode { node });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn p(parts: &[&[usize]]) -> Partition {
        Partition::new(parts.iter().map(|part| part.to_vec()).collect())
    }

    fn network() -> Network {
        // Node 0 copies node 1, node 1 copies node 2, node 2 stays ON.
        let sbn = Array2::from_shape_fn((8, 3), |(row, node)| match node {
            0 => f64::from(u8::from(loli_bit(row, 1))),
            1 => f64::from(u8::from(loli_bit(row, 2))),
            _ => 1.0,
        });
        Network::new(sbn.into_dyn(), vec![1u8, 0, 1], None, None).unwrap()
    }

    #[test]
    fn micro_tpm_conditions_on_background() {
        let network = network();
        let candidate = CandidateSystem::new(
            &[0, 1],
            &network,
            &p(&[&[0], &[1]]),
            &Grouping::new(vec![p(&[&[0], &[1]]), p(&[&[0], &[1]])]),
        );
        // Node 2 is fixed ON, so node 1 always turns ON.
        assert_eq!(
            candidate.micro_tpm().unwrap(),
            array![[0.0, 1.0], [0.0, 1.0], [1.0, 1.0], [1.0, 1.0]]
        );
        assert_eq!(candidate.mapping().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn relative_partition_uses_positions() {
        let network = network();
        let candidate = CandidateSystem::new(
            &[1, 2],
            &network,
            &p(&[&[1, 2]]),
            &Grouping::new(vec![p(&[&[0, 1], &[2]])]),
        );
        assert_eq!(candidate.relative_partition().unwrap(), p(&[&[0, 1]]));
        assert_eq!(candidate.mapping().unwrap(), vec![0, 0, 0, 1]);
        let tpm = candidate.macro_tpm().unwrap();
        assert_eq!(tpm.dim(), (2, 2));
        for row in tpm.outer_iter() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn foreign_nodes_are_reported() {
        let network = network();
        let candidate = CandidateSystem::new(
            &[0],
            &network,
            &p(&[&[2]]),
            &Grouping::new(vec![p(&[&[0], &[1]])]),
        );
        assert_eq!(
            candidate.mapping(),
            Err(ValidationError::UnknownElement { element: 2 })
        );
        let outside = CandidateSystem::new(
            &[0, 3],
            &network,
            &p(&[&[0], &[3]]),
            &Grouping::new(vec![p(&[&[0], &[1]]), p(&[&[0], &[1]])]),
        );
        assert_eq!(
            outside.micro_tpm(),
            Err(ValidationError::NodeOutOfRange { node: 3, size: 3 })
        );
        let repeated = CandidateSystem::new(
            &[1, 1],
            &network,
            &p(&[&[1], &[1]]),
            &Grouping::new(vec![p(&[&[0], &[1]]), p(&[&[0], &[1]])]),
        );
        assert_eq!(
            repeated.micro_tpm(),
            Err(ValidationError::DuplicateNode { node: 1 })
        );
    }
}
