// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Set partitions of `{0, .., size - 1}`.
//!
//! Partitions are generated from restricted growth strings: element `i` is
//! assigned block `a_i` with `a_0 = 0` and `a_i <= 1 + max(a_0, .., a_{i-1})`.
//! Walking those strings lexicographically visits every set partition exactly
//! once, starting with the coarsest one.

use crate::error::PartitionError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Sizes at or above this limit are rejected; the Bell numbers make anything
/// larger impractical to enumerate.
pub const PARTITION_SIZE_LIMIT: usize = 16;

/// Tables for sizes below this bound are cached for the life of the process.
pub const CACHED_TABLE_SIZES: usize = 11;

/// An ordered sequence of disjoint, non-empty parts covering an index set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partition(Vec<Vec<usize>>);

impl Partition {
    pub fn new(parts: Vec<Vec<usize>>) -> Self {
        Self(parts)
    }

    /// The single-part partition of `{0, .., size - 1}` (empty for `size == 0`).
    pub fn coarsest(size: usize) -> Self {
        if size == 0 {
            Self::default()
        } else {
            Self(vec![(0..size).collect()])
        }
    }

    pub fn parts(&self) -> &[Vec<usize>] {
        &self.0
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<usize>> {
        self.0.iter()
    }

    /// Total number of elements across all parts.
    pub fn element_count(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// Replaces every element `i` by `indices[i]`.
    ///
    /// # Panics
    /// If an element is out of range for `indices`.
    pub fn map_onto(&self, indices: &[usize]) -> Partition {
        Partition(
            self.0
                .iter()
                .map(|part| part.iter().map(|&i| indices[i]).collect())
                .collect(),
        )
    }
}

impl From<Vec<Vec<usize>>> for Partition {
    fn from(parts: Vec<Vec<usize>>) -> Self {
        Self(parts)
    }
}

impl<'a> IntoIterator for &'a Partition {
    type Item = &'a Vec<usize>;
    type IntoIter = std::slice::Iter<'a, Vec<usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Every set partition of `{0, .., size - 1}` in restricted-growth-string
/// order. Cloning restarts from the clone's position.
#[derive(Clone, Debug)]
pub struct SetPartitions {
    rgs: Vec<usize>,
    // maxima[i] = max(rgs[..=i])
    maxima: Vec<usize>,
    exhausted: bool,
}

impl SetPartitions {
    pub fn new(size: usize) -> Self {
        Self {
            rgs: vec![0; size],
            maxima: vec![0; size],
            exhausted: false,
        }
    }

    fn current(&self) -> Partition {
        let blocks = self.maxima.last().map_or(0, |&m| m + 1);
        let mut parts = vec![Vec::new(); blocks];
        for (element, &block) in self.rgs.iter().enumerate() {
            parts[block].push(element);
        }
        Partition(parts)
    }

    fn advance(&mut self) {
        let n = self.rgs.len();
        for i in (1..n).rev() {
            if self.rgs[i] <= self.maxima[i - 1] {
                self.rgs[i] += 1;
                self.maxima[i] = self.maxima[i - 1].max(self.rgs[i]);
                for j in i + 1..n {
                    self.rgs[j] = 0;
                    self.maxima[j] = self.maxima[i];
                }
                return;
            }
        }
        self.exhausted = true;
    }
}

impl Iterator for SetPartitions {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        if self.exhausted {
            return None;
        }
        let partition = self.current();
        self.advance();
        Some(partition)
    }
}

/// Lazy partition stream in table order: every partition except the
/// coarsest, followed by the coarsest exactly once.
#[derive(Clone, Debug)]
pub struct Partitions {
    inner: SetPartitions,
    coarsest: Option<Partition>,
}

impl Iterator for Partitions {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        self.inner.next().or_else(|| self.coarsest.take())
    }
}

fn check_size(size: usize) -> Result<(), PartitionError> {
    if size >= PARTITION_SIZE_LIMIT {
        return Err(PartitionError::UnsupportedPartitionSize {
            size,
            limit: PARTITION_SIZE_LIMIT,
        });
    }
    Ok(())
}

/// Streams every partition of `{0, .., size - 1}` without materializing them.
pub fn partitions(size: usize) -> Result<Partitions, PartitionError> {
    check_size(size)?;
    let mut inner = SetPartitions::new(size);
    // The first restricted growth string is all zeros: the coarsest partition.
    let coarsest = if size > 0 { inner.next() } else { None };
    Ok(Partitions { inner, coarsest })
}

static TABLES: OnceLock<Vec<OnceLock<Arc<[Partition]>>>> = OnceLock::new();

fn tables() -> &'static [OnceLock<Arc<[Partition]>>] {
    TABLES.get_or_init(|| (0..CACHED_TABLE_SIZES).map(|_| OnceLock::new()).collect())
}

/// All partitions of `{0, .., size - 1}`, in the order of [`partitions`].
///
/// Small tables are computed once and shared; larger ones are built on every
/// call.
pub fn all_partitions(size: usize) -> Result<Arc<[Partition]>, PartitionError> {
    let stream = partitions(size)?;
    match tables().get(size) {
        Some(slot) => Ok(Arc::clone(slot.get_or_init(|| stream.collect()))),
        None => Ok(stream.collect()),
    }
}

/// Bell number `B(n)`, the number of set partitions of `n` elements.
pub fn bell_number(n: usize) -> u128 {
    // Bell triangle: each row starts with the last entry of the previous one.
    let mut row = vec![1u128];
    for _ in 0..n {
        let mut next = Vec::with_capacity(row.len() + 1);
        next.push(row[row.len() - 1]);
        for &value in &row {
            let last = next[next.len() - 1];
            next.push(last + value);
        }
        row = next;
    }
    row[0]
}
