// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Correspondences between micro-states and macro-states.
//!
//! For a part of `k` micro-nodes the micro-state is summarized by how many of
//! them are ON, a number in `{0, .., k}`. A grouping assigns those counts to
//! classes, one class partition per part; class `0` and class `1` are the
//! two states of the binary macro-element.

use crate::error::PartitionError;
use crate::partition::{all_partitions, Partition};
use serde::{Deserialize, Serialize};

/// Every class of an admissible grouping has at most this many members.
pub const MAX_CLASS_LEN: usize = 2;

/// A macro-element is binary, so each part has at most this many classes.
pub const MAX_CLASSES: usize = 2;

/// One class partition of `{0, .., k}` per part of the coarse-graining.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grouping(Vec<Partition>);

impl Grouping {
    pub fn new(classes: Vec<Partition>) -> Self {
        Self(classes)
    }

    /// Per-part class partitions, in partition order.
    pub fn classes(&self) -> &[Partition] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Partition> {
        self.0.iter()
    }

    /// Whether every part has at most [`MAX_CLASSES`] classes, each with at
    /// most [`MAX_CLASS_LEN`] members.
    pub fn is_admissible(&self) -> bool {
        self.is_binary() && self.0.iter().all(classes_admissible)
    }

    /// Whether every part maps onto at most [`MAX_CLASSES`] macro-states.
    pub fn is_binary(&self) -> bool {
        self.0.iter().all(|classes| classes.len() <= MAX_CLASSES)
    }
}

impl From<Vec<Partition>> for Grouping {
    fn from(classes: Vec<Partition>) -> Self {
        Self(classes)
    }
}

fn classes_admissible(classes: &Partition) -> bool {
    classes.iter().all(|class| class.len() <= MAX_CLASS_LEN)
}

fn part_groupings(k: usize) -> Result<Vec<Partition>, PartitionError> {
    if k == 1 {
        return Ok(vec![Partition::new(vec![vec![0], vec![1]])]);
    }
    Ok(all_partitions(k + 1)?
        .iter()
        .filter(|classes| classes_admissible(classes))
        .cloned()
        .collect())
}

/// Lazy Cartesian product of the admissible per-part groupings, last part
/// varying fastest.
#[derive(Clone, Debug)]
pub struct Groupings {
    options: Vec<Vec<Partition>>,
    cursor: Vec<usize>,
    exhausted: bool,
}

impl Groupings {
    fn advance(&mut self) {
        for slot in (0..self.cursor.len()).rev() {
            self.cursor[slot] += 1;
            if self.cursor[slot] < self.options[slot].len() {
                return;
            }
            self.cursor[slot] = 0;
        }
        self.exhausted = true;
    }
}

impl Iterator for Groupings {
    type Item = Grouping;

    fn next(&mut self) -> Option<Grouping> {
        while !self.exhausted {
            let grouping = Grouping(
                self.cursor
                    .iter()
                    .zip(&self.options)
                    .map(|(&choice, options)| options[choice].clone())
                    .collect(),
            );
            self.advance();
            // Per-part options only bound class sizes.
            if grouping.is_binary() {
                return Some(grouping);
            }
        }
        None
    }
}

/// Streams every admissible grouping for `partition`.
///
/// A part of one node can only map `{0}` and `{1}` to different macro-states.
/// Larger parts of `k` nodes draw from the partitions of `{0, .., k}` whose
/// classes have fewer than three members, and every part of a yielded
/// grouping has fewer than three classes.
pub fn groupings(partition: &Partition) -> Result<Groupings, PartitionError> {
    if let Some(part) = partition.iter().position(Vec::is_empty) {
        return Err(PartitionError::EmptyPartitionPart { part });
    }
    let options = partition
        .iter()
        .map(|members| part_groupings(members.len()))
        .collect::<Result<Vec<_>, _>>()?;
    let exhausted = options.iter().any(Vec::is_empty);
    Ok(Groupings {
        cursor: vec![0; options.len()],
        options,
        exhausted,
    })
}

pub fn all_groupings(partition: &Partition) -> Result<Vec<Grouping>, PartitionError> {
    Ok(groupings(partition)?.collect())
}
