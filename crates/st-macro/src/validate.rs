// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Structural and semantic checks on network inputs.

use crate::convert::{
    node_layout, state_by_node_to_state_by_state, state_by_state_nodes,
    state_by_state_to_state_by_node, to_n_dimensional,
};
use crate::error::ValidationError;
use crate::network::Network;
use crate::EPSILON;
use ndarray::{Array1, Array2, ArrayD, Axis};

fn max_abs_deviation<'a>(
    left: impl IntoIterator<Item = &'a f64>,
    right: impl IntoIterator<Item = &'a f64>,
) -> f64 {
    left.into_iter()
        .zip(right)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

/// Largest absolute difference between `tpm` and its conversion round trip.
///
/// Square TPMs go state-by-state → state-by-node → state-by-state; state-by-node
/// TPMs go the other way around.
pub fn round_trip_deviation(tpm: &ArrayD<f64>) -> Result<f64, ValidationError> {
    if node_layout(tpm).is_some() {
        let there = state_by_node_to_state_by_state(tpm)?.into_dyn();
        let back = state_by_state_to_state_by_node(&there)?;
        let original = to_n_dimensional(tpm)?;
        return Ok(max_abs_deviation(original.iter(), back.iter()));
    }
    let there = state_by_state_to_state_by_node(tpm)?;
    let back = state_by_node_to_state_by_state(&there)?;
    Ok(max_abs_deviation(tpm.iter(), back.iter()))
}

/// Whether `tpm` survives the conversion round trip within [`EPSILON`].
pub fn conditionally_independent(tpm: &ArrayD<f64>) -> Result<bool, ValidationError> {
    Ok(round_trip_deviation(tpm)? < EPSILON)
}

/// Validates the shape of a TPM, and the conditional independence of a
/// square one.
pub fn validate_tpm(tpm: &ArrayD<f64>) -> Result<(), ValidationError> {
    if node_layout(tpm).is_some() {
        return Ok(());
    }
    if tpm.ndim() == 2 && state_by_state_nodes(tpm).is_some() {
        let deviation = round_trip_deviation(tpm)?;
        if deviation < EPSILON {
            return Ok(());
        }
        return Err(ValidationError::NonConditionallyIndependentTpm { deviation });
    }
    Err(ValidationError::InvalidTpmShape {
        shape: tpm.shape().to_vec(),
    })
}

/// A connectivity matrix must be square and binary. Empty matrices pass.
pub fn validate_connectivity_matrix(cm: &Array2<f64>) -> Result<(), ValidationError> {
    if cm.is_empty() {
        return Ok(());
    }
    let fail = |reason| ValidationError::InvalidConnectivityMatrix {
        shape: cm.shape().to_vec(),
        reason,
    };
    if cm.nrows() != cm.ncols() {
        return Err(fail("connectivity matrix must be square"));
    }
    if cm.iter().any(|&v| v != 0.0 && v != 1.0) {
        return Err(fail("connectivity matrix must contain only binary values"));
    }
    Ok(())
}

pub fn validate_current_state_length(state: &[u8], size: usize) -> Result<(), ValidationError> {
    if state.len() != size {
        return Err(ValidationError::StateLengthMismatch {
            expected: size,
            got: state.len(),
        });
    }
    Ok(())
}

/// Perturbation vectors hold one probability per node.
pub fn validate_perturb_vector(pv: &Array1<f64>, size: usize) -> Result<(), ValidationError> {
    let fail = |value| ValidationError::InvalidPerturbationVector {
        expected: size,
        got: pv.len(),
        value,
    };
    if pv.len() != size {
        return Err(fail(None));
    }
    if let Some(&value) = pv.iter().find(|v| !(0.0..=1.0).contains(*v)) {
        return Err(fail(Some(value)));
    }
    Ok(())
}

/// Fails unless some TPM row lies strictly within distance 1 of `state` in
/// every coordinate, i.e. the state has nonzero probability from some past
/// state.
pub fn validate_state_reachable(state: &[u8], tpm: &ArrayD<f64>) -> Result<(), ValidationError> {
    let Some(&nodes) = tpm.shape().last() else {
        return Err(ValidationError::InvalidTpmShape {
            shape: tpm.shape().to_vec(),
        });
    };
    validate_current_state_length(state, nodes)?;
    let reachable = tpm.lanes(Axis(tpm.ndim() - 1)).into_iter().any(|row| {
        row.iter()
            .zip(state)
            .all(|(&p, &bit)| (p - f64::from(bit)).abs() < 1.0)
    });
    if reachable {
        Ok(())
    } else {
        Err(ValidationError::UnreachableState {
            state: state.to_vec(),
        })
    }
}

/// Runs every network-level check.
pub fn validate_network(network: &Network) -> Result<(), ValidationError> {
    let size = network.size();
    validate_tpm(network.tpm())?;
    validate_current_state_length(network.current_state(), size)?;
    let cm = network.connectivity_matrix();
    validate_connectivity_matrix(cm)?;
    validate_perturb_vector(network.perturb_vector(), size)?;
    if !cm.is_empty() && cm.nrows() != size {
        return Err(ValidationError::InvalidConnectivityMatrix {
            shape: cm.shape().to_vec(),
            reason: "connectivity matrix must be N x N for the network's N nodes",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn accepts_supported_layouts() {
        let sbn = Array2::from_elem((8, 3), 0.5).into_dyn();
        validate_tpm(&sbn).unwrap();
        let nd = to_n_dimensional(&sbn).unwrap();
        validate_tpm(&nd).unwrap();
        let sbs = Array2::from_elem((4, 4), 0.25).into_dyn();
        validate_tpm(&sbs).unwrap();
    }

    #[test]
    fn rejects_bad_shapes() {
        let rect = Array2::<f64>::zeros((5, 3)).into_dyn();
        assert!(matches!(
            validate_tpm(&rect),
            Err(ValidationError::InvalidTpmShape { shape }) if shape == vec![5, 3]
        ));
        let cube = ArrayD::<f64>::zeros(ndarray::IxDyn(&[2, 3, 2]));
        assert!(validate_tpm(&cube).is_err());
    }

    #[test]
    fn rejects_correlated_state_by_state_tpm() {
        // Both nodes always flip together: the next state is 00 or 11.
        let sbs = array![
            [0.5, 0.0, 0.0, 0.5],
            [0.5, 0.0, 0.0, 0.5],
            [0.5, 0.0, 0.0, 0.5],
            [0.5, 0.0, 0.0, 0.5]
        ]
        .into_dyn();
        assert!(!conditionally_independent(&sbs).unwrap());
        assert!(matches!(
            validate_tpm(&sbs),
            Err(ValidationError::NonConditionallyIndependentTpm { deviation }) if deviation > 0.2
        ));
    }

    #[test]
    fn connectivity_rules() {
        validate_connectivity_matrix(&Array2::zeros((0, 0))).unwrap();
        validate_connectivity_matrix(&array![[0.0, 1.0], [1.0, 0.0]]).unwrap();
        assert!(validate_connectivity_matrix(&Array2::zeros((2, 3))).is_err());
        assert!(validate_connectivity_matrix(&array![[0.0, 0.5], [1.0, 0.0]]).is_err());
    }

    #[test]
    fn perturbation_vector_rules() {
        validate_perturb_vector(&array![0.0, 0.5, 1.0], 3).unwrap();
        assert_eq!(
            validate_perturb_vector(&array![0.5, 0.5], 3),
            Err(ValidationError::InvalidPerturbationVector {
                expected: 3,
                got: 2,
                value: None
            })
        );
        assert_eq!(
            validate_perturb_vector(&array![0.5, 1.5], 2),
            Err(ValidationError::InvalidPerturbationVector {
                expected: 2,
                got: 2,
                value: Some(1.5)
            })
        );
    }

    #[test]
    fn state_length_rule() {
        validate_current_state_length(&[0, 1], 2).unwrap();
        assert_eq!(
            validate_current_state_length(&[0, 1, 1], 2),
            Err(ValidationError::StateLengthMismatch {
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn reachability_requires_a_compatible_row() {
        let tpm = array![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0], [1.0, 0.0]].into_dyn();
        validate_state_reachable(&[1, 0], &tpm).unwrap();
        assert_eq!(
            validate_state_reachable(&[1, 1], &tpm),
            Err(ValidationError::UnreachableState { state: vec![1, 1] })
        );
        let noisy = Array2::from_elem((4, 2), 0.3).into_dyn();
        validate_state_reachable(&[1, 1], &noisy).unwrap();
    }
}
