// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Conversions between transition probability matrix layouts.
//!
//! A *state-by-node* TPM holds, for every past state and every node, the
//! probability that the node is ON at the next step. It comes in two layouts:
//!
//! * 2-D `(2^N, N)`, rows indexed by the LOLI index of the past state;
//! * N-D `[2; N] + [N]`, indexed by the past state itself followed by the node.
//!
//! A *state-by-state* TPM is square `(2^N, 2^N)`; entry `(r, c)` is the
//! probability of moving from state `r` to state `c`, both LOLI indices.

use crate::error::ValidationError;
use crate::state::{loli_bit, state_count, state_to_loli_index};
use ndarray::{Array2, ArrayD, ArrayView2, Ix2, IxDyn};

/// `2^nodes`, or `None` when it does not fit in `usize`.
#[inline]
pub(crate) fn checked_state_count(nodes: usize) -> Option<usize> {
    u32::try_from(nodes)
        .ok()
        .and_then(|shift| 1usize.checked_shl(shift))
}

fn shape_error(tpm: &ArrayD<f64>) -> ValidationError {
    ValidationError::InvalidTpmShape {
        shape: tpm.shape().to_vec(),
    }
}

/// Layout of a state-by-node TPM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeLayout {
    /// `(2^N, N)`.
    TwoDimensional { nodes: usize },
    /// `[2; N] + [N]` with `N != 1` (for one node both layouts coincide).
    NDimensional { nodes: usize },
}

impl NodeLayout {
    pub(crate) fn nodes(self) -> usize {
        match self {
            NodeLayout::TwoDimensional { nodes } | NodeLayout::NDimensional { nodes } => nodes,
        }
    }
}

/// Classifies `tpm` as one of the state-by-node layouts.
pub(crate) fn node_layout(tpm: &ArrayD<f64>) -> Option<NodeLayout> {
    let shape = tpm.shape();
    let nodes = *shape.last()?;
    if shape.len() == 2 && checked_state_count(nodes) == Some(shape[0]) {
        return Some(NodeLayout::TwoDimensional { nodes });
    }
    if shape.len() == nodes + 1 && shape[..nodes].iter().all(|&axis| axis == 2) {
        return Some(NodeLayout::NDimensional { nodes });
    }
    None
}

/// Number of nodes of a square state-by-state TPM, if `tpm` is one.
pub(crate) fn state_by_state_nodes(tpm: &ArrayD<f64>) -> Option<usize> {
    let shape = tpm.shape();
    if shape.len() != 2 || shape[0] != shape[1] || !shape[0].is_power_of_two() {
        return None;
    }
    Some(shape[0].trailing_zeros() as usize)
}

fn expand_rows(rows: ArrayView2<'_, f64>) -> ArrayD<f64> {
    let nodes = rows.ncols();
    let mut shape = vec![2usize; nodes];
    shape.push(nodes);
    ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        let row = (0..nodes).fold(0usize, |acc, axis| acc | (idx[axis] << axis));
        rows[[row, idx[nodes]]]
    })
}

/// Reshapes a 2-D state-by-node TPM into its N-D form.
///
/// The state axes follow column-major (Fortran) order so that
/// `nd[s_0, .., s_{N-1}, n] == tpm[loli(s), n]`: node 0 is the fastest-varying
/// bit of the row index. N-D input is returned unchanged.
pub fn to_n_dimensional(tpm: &ArrayD<f64>) -> Result<ArrayD<f64>, ValidationError> {
    match node_layout(tpm).ok_or_else(|| shape_error(tpm))? {
        NodeLayout::TwoDimensional { .. } => {
            let rows = tpm
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|_| shape_error(tpm))?;
            Ok(expand_rows(rows))
        }
        NodeLayout::NDimensional { .. } => Ok(tpm.clone()),
    }
}

/// Flattens a state-by-node TPM into its 2-D `(2^N, N)` form with LOLI rows.
pub fn to_two_dimensional(tpm: &ArrayD<f64>) -> Result<Array2<f64>, ValidationError> {
    match node_layout(tpm).ok_or_else(|| shape_error(tpm))? {
        NodeLayout::TwoDimensional { .. } => tpm
            .view()
            .into_dimensionality::<Ix2>()
            .map(|rows| rows.to_owned())
            .map_err(|_| shape_error(tpm)),
        NodeLayout::NDimensional { nodes } => {
            let states = state_count(nodes);
            let mut index = vec![0usize; nodes + 1];
            Ok(Array2::from_shape_fn((states, nodes), |(row, col)| {
                for (axis, slot) in index.iter_mut().take(nodes).enumerate() {
                    *slot = (row >> axis) & 1;
                }
                index[nodes] = col;
                tpm[IxDyn(&index)]
            }))
        }
    }
}

/// Whether every entry of `tpm` is exactly 0 or 1.
pub fn is_deterministic(tpm: &ArrayD<f64>) -> bool {
    !tpm.iter().any(|&p| p > 0.0 && p < 1.0)
}

/// Converts a square state-by-state TPM into N-D state-by-node form.
///
/// `P(n ON | i) = Σ tpm[i, c]` over every next state `c` in which node `n`
/// is ON.
pub fn state_by_state_to_state_by_node(tpm: &ArrayD<f64>) -> Result<ArrayD<f64>, ValidationError> {
    let nodes = state_by_state_nodes(tpm).ok_or_else(|| shape_error(tpm))?;
    let square = tpm
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| shape_error(tpm))?;
    let states = square.nrows();

    let mut rows = Array2::<f64>::zeros((states, nodes));
    for (past, next) in square.outer_iter().enumerate() {
        for (current, &p) in next.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            for node in 0..nodes {
                if loli_bit(current, node) {
                    rows[[past, node]] += p;
                }
            }
        }
    }
    Ok(expand_rows(rows.view()))
}

/// Converts a state-by-node TPM (2-D or N-D) into a square state-by-state TPM.
///
/// Deterministic TPMs map each past state to the single next state given by
/// its row. Otherwise nodes are assumed conditionally independent given the
/// past state, and each transition probability is the product of the per-node
/// marginals.
pub fn state_by_node_to_state_by_state(tpm: &ArrayD<f64>) -> Result<Array2<f64>, ValidationError> {
    let rows = to_two_dimensional(tpm)?;
    let (states, nodes) = rows.dim();
    let mut sbs = Array2::<f64>::zeros((states, states));

    if is_deterministic(tpm) {
        let mut next = vec![0u8; nodes];
        for (past, row) in rows.outer_iter().enumerate() {
            for (slot, &p) in next.iter_mut().zip(row.iter()) {
                *slot = u8::from(p >= 0.5);
            }
            sbs[[past, state_to_loli_index(&next)]] = 1.0;
        }
        return Ok(sbs);
    }

    for (past, row) in rows.outer_iter().enumerate() {
        for current in 0..states {
            sbs[[past, current]] = row
                .iter()
                .enumerate()
                .map(|(node, &p)| if loli_bit(current, node) { p } else { 1.0 - p })
                .product();
        }
    }
    Ok(sbs)
}
