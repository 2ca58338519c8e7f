// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use thiserror::Error;

/// Invalid network input. None of these are transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(
        "invalid TPM shape {shape:?}: a state-by-node TPM must be (2^N, N) or [2; N] + [N], \
         a state-by-state TPM must be square with 2^N rows"
    )]
    InvalidTpmShape { shape: Vec<usize> },
    #[error("TPM is not conditionally independent (round trip deviates by {deviation})")]
    NonConditionallyIndependentTpm { deviation: f64 },
    #[error("invalid connectivity matrix of shape {shape:?}: {reason}")]
    InvalidConnectivityMatrix {
        shape: Vec<usize>,
        reason: &'static str,
    },
    #[error("invalid state: there must be one entry per node; got {got} entries for {expected} nodes")]
    StateLengthMismatch { expected: usize, got: usize },
    #[error(
        "invalid perturbation vector: expected {expected} probabilities in [0, 1], \
         got {got} entries (offending value: {value:?})"
    )]
    InvalidPerturbationVector {
        expected: usize,
        got: usize,
        value: Option<f64>,
    },
    #[error("state {state:?} cannot be reached from any past state of the TPM")]
    UnreachableState { state: Vec<u8> },
    #[error("mapping covers {mapping} micro-states but the TPM has {states}")]
    MappingLengthMismatch { states: usize, mapping: usize },
    #[error(
        "grouping entry for part {part} is missing, does not cover every ON count, \
         or has more than two classes"
    )]
    MismatchedGrouping { part: usize },
    #[error("node {element} is not part of the candidate system")]
    UnknownElement { element: usize },
    #[error("node {node} does not exist in a network of {size} nodes")]
    NodeOutOfRange { node: usize, size: usize },
    #[error("node {node} appears more than once in the candidate system")]
    DuplicateNode { node: usize },
}

/// Failures raised by the partition and grouping enumerators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("part {part} of the partition is empty; every part needs at least one element")]
    EmptyPartitionPart { part: usize },
    #[error("set partitions are not available for {size} elements (limit is {limit})")]
    UnsupportedPartitionSize { size: usize, limit: usize },
}

/// Errors surfaced by the coarse-graining search.
///
/// Oracle failures are passed through untouched.
#[derive(Debug, Error)]
pub enum SearchError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("phi oracle failed: {0}")]
    Oracle(#[source] E),
}

impl<E> SearchError<E>
where
    E: std::error::Error + 'static,
{
    /// Returns the oracle error, if that is what stopped the search.
    pub fn oracle(&self) -> Option<&E> {
        match self {
            SearchError::Oracle(err) => Some(err),
            SearchError::Partition(_) | SearchError::Validation(_) => None,
        }
    }
}
