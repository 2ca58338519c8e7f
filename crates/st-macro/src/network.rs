// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::convert::{
    node_layout, state_by_node_to_state_by_state, state_by_state_to_state_by_node,
    to_n_dimensional,
};
use crate::error::ValidationError;
use crate::state::state_count;
use crate::validate;
use ndarray::{Array1, Array2, ArrayD};
use serde::Serialize;

/// A validated network of binary nodes.
///
/// The TPM is stored in N-D state-by-node form regardless of the layout it was
/// provided in; `tpm()[(s_0, .., s_{N-1}, n)]` is the probability that node `n`
/// is ON after the network was in state `s`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Network {
    tpm: ArrayD<f64>,
    current_state: Vec<u8>,
    connectivity_matrix: Array2<f64>,
    perturb_vector: Array1<f64>,
    #[serde(skip)]
    node_indices: Vec<usize>,
}

impl Network {
    /// Builds and validates a network.
    ///
    /// `tpm` may be 2-D state-by-node, N-D state-by-node, or square
    /// state-by-state. A missing connectivity matrix connects every node to
    /// every node (self-loops included); a missing perturbation vector is
    /// maximum entropy (`0.5` per node).
    pub fn new(
        tpm: ArrayD<f64>,
        current_state: impl Into<Vec<u8>>,
        connectivity_matrix: Option<Array2<f64>>,
        perturb_vector: Option<Array1<f64>>,
    ) -> Result<Self, ValidationError> {
        validate::validate_tpm(&tpm)?;
        let tpm = if node_layout(&tpm).is_some() {
            to_n_dimensional(&tpm)?
        } else {
            state_by_state_to_state_by_node(&tpm)?
        };
        let size = tpm.shape().last().copied().unwrap_or(0);
        let network = Self {
            tpm,
            current_state: current_state.into(),
            connectivity_matrix: connectivity_matrix
                .unwrap_or_else(|| Array2::ones((size, size))),
            perturb_vector: perturb_vector.unwrap_or_else(|| Array1::from_elem(size, 0.5)),
            node_indices: (0..size).collect(),
        };
        validate::validate_network(&network)?;
        tracing::debug!(nodes = size, "validated network");
        Ok(network)
    }

    /// Returns a copy of this network in a different current state.
    pub fn with_current_state(&self, state: impl Into<Vec<u8>>) -> Result<Self, ValidationError> {
        let state = state.into();
        validate::validate_current_state_length(&state, self.size())?;
        Ok(Self {
            current_state: state,
            ..self.clone()
        })
    }

    pub fn size(&self) -> usize {
        self.node_indices.len()
    }

    pub fn num_states(&self) -> usize {
        state_count(self.size())
    }

    pub fn node_indices(&self) -> &[usize] {
        &self.node_indices
    }

    /// N-D state-by-node TPM.
    pub fn tpm(&self) -> &ArrayD<f64> {
        &self.tpm
    }

    /// The TPM in state-by-state form (rows and columns are LOLI indices).
    pub fn state_by_state_tpm(&self) -> Result<Array2<f64>, ValidationError> {
        state_by_node_to_state_by_state(&self.tpm)
    }

    pub fn current_state(&self) -> &[u8] {
        &self.current_state
    }

    pub fn connectivity_matrix(&self) -> &Array2<f64> {
        &self.connectivity_matrix
    }

    pub fn perturb_vector(&self) -> &Array1<f64> {
        &self.perturb_vector
    }
}
