// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Bit conventions between per-node binary states and integer indices.
//!
//! * **LOLI** (low-order bits, low-index nodes): node `n` contributes `2^n`.
//! * **HOLI** (high-order bits, low-index nodes): node `n` contributes
//!   `2^(N - 1 - n)`, i.e. the LOLI index of the reversed state.

/// Encodes `state` with node `n` in bit `n`.
#[inline]
pub fn state_to_loli_index(state: &[u8]) -> usize {
    state
        .iter()
        .rev()
        .fold(0usize, |acc, &bit| (acc << 1) | usize::from(bit & 1))
}

/// Encodes `state` with node `0` in the most significant bit.
#[inline]
pub fn state_to_holi_index(state: &[u8]) -> usize {
    state
        .iter()
        .fold(0usize, |acc, &bit| (acc << 1) | usize::from(bit & 1))
}

/// Decodes a LOLI index into a state of `nodes` entries.
pub fn loli_index_to_state(index: usize, nodes: usize) -> Vec<u8> {
    (0..nodes).map(|n| ((index >> n) & 1) as u8).collect()
}

/// Decodes a HOLI index into a state of `nodes` entries.
pub fn holi_index_to_state(index: usize, nodes: usize) -> Vec<u8> {
    let mut state = loli_index_to_state(index, nodes);
    state.reverse();
    state
}

/// Whether node `node` is ON in the state with LOLI index `index`.
#[inline]
pub(crate) fn loli_bit(index: usize, node: usize) -> bool {
    (index >> node) & 1 == 1
}

/// Number of states of `nodes` binary nodes.
#[inline]
pub(crate) fn state_count(nodes: usize) -> usize {
    1usize << nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_indices() {
        assert_eq!(state_to_loli_index(&[1, 0, 0, 0, 0]), 1);
        assert_eq!(state_to_holi_index(&[1, 0, 0, 0, 0]), 16);
        assert_eq!(state_to_loli_index(&[1, 1, 1, 0, 0, 0, 0, 0]), 7);
        assert_eq!(state_to_holi_index(&[1, 1, 1, 0, 0, 0, 0, 0]), 224);
        assert_eq!(loli_index_to_state(7, 8), vec![1, 1, 1, 0, 0, 0, 0, 0]);
        assert_eq!(holi_index_to_state(1, 5), vec![0, 0, 0, 0, 1]);
        assert_eq!(holi_index_to_state(7, 8), vec![0, 0, 0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn conversions_round_trip() {
        for nodes in 0..=12 {
            for index in 0..state_count(nodes) {
                let loli = loli_index_to_state(index, nodes);
                assert_eq!(loli.len(), nodes);
                assert_eq!(state_to_loli_index(&loli), index);
                let holi = holi_index_to_state(index, nodes);
                assert_eq!(state_to_holi_index(&holi), index);
            }
        }
    }

    #[test]
    fn holi_is_loli_of_reversed_state() {
        let state = [1u8, 1, 0, 1, 0, 0];
        let mut reversed = state.to_vec();
        reversed.reverse();
        assert_eq!(state_to_holi_index(&state), state_to_loli_index(&reversed));
    }

    #[test]
    fn empty_state_is_index_zero() {
        assert_eq!(state_to_loli_index(&[]), 0);
        assert_eq!(state_to_holi_index(&[]), 0);
        assert!(loli_index_to_state(0, 0).is_empty());
    }
}
