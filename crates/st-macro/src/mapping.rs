// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::convert::{node_layout, state_by_node_to_state_by_state, state_by_state_nodes};
use crate::error::ValidationError;
use crate::grouping::{Grouping, MAX_CLASSES};
use crate::partition::Partition;
use crate::state::{loli_bit, state_count};
use ndarray::{Array2, ArrayD, Ix2};

/// Maps every micro-state to its macro-state.
///
/// `partition` must use positions `0..n` where `n` is its element count.
/// Entry `s` of the result is the LOLI index of the macro-state reached from
/// micro-state `s` (LOLI over the `n` positions): macro-element `j` takes the
/// index of the class of `grouping[j]` containing the number of ON nodes in
/// part `j`. Each part must have at most [`MAX_CLASSES`] classes, since a
/// macro-element contributes a single bit to the macro-state index.
pub fn make_mapping(
    partition: &Partition,
    grouping: &Grouping,
) -> Result<Vec<usize>, ValidationError> {
    // lookup[j][count] = class of part j holding `count` ON nodes
    let mut lookup = Vec::with_capacity(partition.len());
    for (part, members) in partition.iter().enumerate() {
        let classes = grouping
            .classes()
            .get(part)
            .ok_or(ValidationError::MismatchedGrouping { part })?;
        if classes.len() > MAX_CLASSES {
            return Err(ValidationError::MismatchedGrouping { part });
        }
        let mut class_of = vec![None; members.len() + 1];
        for (class_index, class) in classes.iter().enumerate() {
            for &count in class {
                if let Some(slot) = class_of.get_mut(count) {
                    *slot = Some(class_index);
                }
            }
        }
        let class_of = class_of
            .into_iter()
            .collect::<Option<Vec<usize>>>()
            .ok_or(ValidationError::MismatchedGrouping { part })?;
        lookup.push(class_of);
    }

    let nodes = partition.element_count();
    Ok((0..state_count(nodes))
        .map(|micro| {
            partition
                .iter()
                .zip(&lookup)
                .enumerate()
                .fold(0usize, |macro_index, (element, (members, class_of))| {
                    let on = members.iter().filter(|&&node| loli_bit(micro, node)).count();
                    macro_index | (class_of[on] << element)
                })
        })
        .collect())
}

/// Builds the macro-level state-by-state TPM induced by `mapping`.
///
/// `micro_tpm` may be square state-by-state or state-by-node (2-D or N-D).
/// Transition mass is accumulated per (macro past, macro next) pair and every
/// non-empty row is normalized to sum to one.
pub fn make_macro_tpm(micro_tpm: &ArrayD<f64>, mapping: &[usize]) -> Result<Array2<f64>, ValidationError> {
    let sbs = if node_layout(micro_tpm).is_some() {
        state_by_node_to_state_by_state(micro_tpm)?
    } else if state_by_state_nodes(micro_tpm).is_some() {
        micro_tpm
            .view()
            .into_dimensionality::<Ix2>()
            .map(|view| view.to_owned())
            .map_err(|_| ValidationError::InvalidTpmShape {
                shape: micro_tpm.shape().to_vec(),
            })?
    } else {
        return Err(ValidationError::InvalidTpmShape {
            shape: micro_tpm.shape().to_vec(),
        });
    };

    if mapping.len() != sbs.nrows() {
        return Err(ValidationError::MappingLengthMismatch {
            states: sbs.nrows(),
            mapping: mapping.len(),
        });
    }

    let macro_states = mapping.iter().max().map_or(0, |&m| m + 1);
    let mut macro_tpm = Array2::<f64>::zeros((macro_states, macro_states));
    for (past, row) in sbs.outer_iter().enumerate() {
        for (current, &p) in row.iter().enumerate() {
            macro_tpm[[mapping[past], mapping[current]]] += p;
        }
    }
    for mut row in macro_tpm.outer_iter_mut() {
        let total = row.sum();
        if total > 0.0 {
            row /= total;
        }
    }
    Ok(macro_tpm)
}
