// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use ndarray::{array, Array2};
use st_macro::{
    coarse_grain, CandidateSystem, Grouping, MacroSearch, Network, Partition, PhiOracle,
    ValidationError, EPSILON,
};

/// Scores a candidate by the effective information of its macro TPM under a
/// uniform intervention distribution.
struct EffectiveInformation;

fn effective_information(tpm: &Array2<f64>) -> f64 {
    let states = tpm.nrows();
    if states == 0 {
        return 0.0;
    }
    let entropy = |p: f64| if p > 1e-10 { -p * p.ln() } else { 0.0 };
    let marginal = tpm.sum_axis(ndarray::Axis(0)) / states as f64;
    let h_effect: f64 = marginal.iter().map(|&p| entropy(p)).sum();
    let h_cond: f64 = tpm
        .outer_iter()
        .map(|row| row.iter().map(|&p| entropy(p)).sum::<f64>())
        .sum::<f64>()
        / states as f64;
    (h_effect - h_cond).max(0.0)
}

impl PhiOracle for EffectiveInformation {
    type Candidate<'n> = Array2<f64>;
    type Error = ValidationError;

    fn build_candidate<'n>(
        &self,
        indices: &[usize],
        network: &'n Network,
        output_grouping: &Partition,
        state_grouping: &Grouping,
    ) -> Result<Array2<f64>, ValidationError> {
        CandidateSystem::new(indices, network, output_grouping, state_grouping).macro_tpm()
    }

    fn phi(&self, candidate: &Array2<f64>) -> Result<f64, ValidationError> {
        Ok(effective_information(candidate))
    }

    fn main_complex_phi(&self, network: &Network) -> Result<f64, ValidationError> {
        Ok(effective_information(&network.state_by_state_tpm()?))
    }
}

fn search(oracle: &EffectiveInformation) -> MacroSearch<'_, EffectiveInformation> {
    MacroSearch::new(oracle).with_epsilon(EPSILON).with_parallel(false)
}

#[test]
fn single_deterministic_node_has_no_emergence() {
    let _ = spiral_config::init_tracing();
    // NOT gate.
    let network = Network::new(array![[1.0], [0.0]].into_dyn(), vec![0u8], None, None).unwrap();
    let oracle = EffectiveInformation;
    let result = search(&oracle).emergence(&network).unwrap();
    assert_eq!(result.system(), &[0]);
    assert_eq!(result.partition(), &Partition::new(vec![vec![0]]));
    assert_eq!(result.emergence(), 0.0);
    assert!((result.phi() - std::f64::consts::LN_2).abs() < 1e-12);
}

#[test]
fn full_resolution_bounds_the_search_from_below() {
    let sbn = array![[0.9, 0.1], [0.2, 0.8], [0.7, 0.3], [0.4, 0.6]];
    let network = Network::new(sbn.into_dyn(), vec![1u8, 0], None, None).unwrap();
    let oracle = EffectiveInformation;
    let result = search(&oracle).emergence(&network).unwrap();
    assert!(
        result.emergence() >= -EPSILON,
        "emergence {} below the micro scale",
        result.emergence()
    );
    assert!(result.phi() >= 0.0);

    // The reported phi is reproducible from the reported coarse-graining.
    let rebuilt = oracle
        .build_candidate(result.system(), &network, result.partition(), result.grouping())
        .unwrap();
    assert_eq!(oracle.phi(&rebuilt).unwrap(), result.phi());
}

#[test]
fn copy_loop_keeps_its_micro_description() {
    // Two nodes swapping their states: fully deterministic and reversible, so
    // no macro description can carry more information.
    let sbn = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
    let network = Network::new(sbn.into_dyn(), vec![0u8, 1], None, None).unwrap();
    let oracle = EffectiveInformation;
    let result = search(&oracle).emergence(&network).unwrap();
    assert!((result.micro_phi() - 4f64.ln()).abs() < 1e-12);
    assert_eq!(result.system(), &[0, 1]);
    assert_eq!(result.emergence(), 0.0);
}

#[test]
fn free_functions_use_the_shared_configuration() {
    let network = Network::new(Array2::from_elem((4, 2), 0.5).into_dyn(), vec![0u8, 0], None, None)
        .unwrap();
    let oracle = EffectiveInformation;
    assert!(coarse_grain(&[], &network, &oracle).unwrap().is_degenerate());
    let grain = coarse_grain(&[1], &network, &oracle).unwrap();
    assert_eq!(grain.partition, Partition::new(vec![vec![1]]));
    assert_eq!(grain.phi, 0.0);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_emergence_agrees_with_sequential() {
    let sbn = array![
        [0.1, 0.9, 0.5],
        [0.8, 0.2, 0.5],
        [0.3, 0.3, 0.9],
        [1.0, 0.0, 0.2],
        [0.6, 0.4, 0.1],
        [0.0, 1.0, 0.7],
        [0.5, 0.5, 0.5],
        [0.9, 0.9, 0.0]
    ];
    let network = Network::new(sbn.into_dyn(), vec![0u8, 1, 0], None, None).unwrap();
    let oracle = EffectiveInformation;
    let sequential = search(&oracle).emergence_sequential(&network).unwrap();
    let parallel = search(&oracle).with_parallel(true).emergence(&network).unwrap();
    assert_eq!(sequential, parallel);
}
