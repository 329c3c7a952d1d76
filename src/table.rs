//! Sparse state → action-value storage.

use std::collections::HashMap;
use std::hash::Hash;
use std::mem::size_of;

use rand::Rng;
use rand_distr::StandardNormal;
use tracing::trace;

use crate::error::{Error, LoadFailure, Result};

/// Standard deviation of the noise a fresh row is seeded with.
pub const JITTER_STD_DEV: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Distinct states tracked.
    pub entries: usize,
    /// Estimated heap + header footprint of the table. Not exact.
    pub approx_bytes: usize,
}

impl From<TableStats> for (usize, usize) {
    fn from(stats: TableStats) -> Self {
        (stats.entries, stats.approx_bytes)
    }
}

/// Maps each visited state to one value per action.
///
/// Rows are created on first reference and never removed. Every row has
/// exactly `row_len` entries.
#[derive(Debug, Clone)]
pub struct ValueTable<S> {
    rows: HashMap<S, Vec<f32>>,
    row_len: usize,
}

impl<S> ValueTable<S>
where
    S: Eq + Hash + Clone,
{
    pub fn new(row_len: usize) -> Self {
        ValueTable {
            rows: HashMap::new(),
            row_len,
        }
    }

    /// Wraps decoded rows, rejecting any row of the wrong length.
    pub fn from_rows(
        rows: HashMap<S, Vec<f32>>,
        row_len: usize,
    ) -> std::result::Result<Self, LoadFailure> {
        if let Some(bad) = rows.values().find(|row| row.len() != row_len) {
            return Err(LoadFailure::RowLength {
                expected: row_len,
                got: bad.len(),
            });
        }
        Ok(ValueTable { rows, row_len })
    }

    pub fn row_len(&self) -> usize {
        self.row_len
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, state: &S) -> Option<&[f32]> {
        self.rows.get(state).map(Vec::as_slice)
    }

    pub(crate) fn rows(&self) -> &HashMap<S, Vec<f32>> {
        &self.rows
    }

    /// Returns the row for `state`, creating a jittered one if it is new.
    pub fn row_mut<R: Rng>(&mut self, state: &S, rng: &mut R) -> &mut [f32] {
        let row_len = self.row_len;
        let entries = self.rows.len();
        self.rows.entry(state.clone()).or_insert_with(|| {
            trace!(entries = entries + 1, "materialized value row");
            jittered_row(row_len, rng)
        })
    }

    /// Index of the best action for `state`. Ties go to the lowest index.
    pub fn greedy_action<R: Rng>(&mut self, state: &S, rng: &mut R) -> usize {
        first_max_index(self.row_mut(state, rng))
    }

    pub fn stats(&self) -> TableStats {
        let bucket = size_of::<(S, Vec<f32>)>() + 1;
        let payload = self.rows.len() * self.row_len * size_of::<f32>();
        TableStats {
            entries: self.rows.len(),
            approx_bytes: size_of::<HashMap<S, Vec<f32>>>()
                + self.rows.capacity() * bucket
                + payload,
        }
    }

    /// Confirms every row still has `row_len` values.
    pub fn check_rows(&self) -> Result<()> {
        match self.rows.values().find(|row| row.len() != self.row_len) {
            Some(bad) => Err(Error::Serialization {
                message: format!(
                    "row has {} values, expected {}",
                    bad.len(),
                    self.row_len
                ),
            }),
            None => Ok(()),
        }
    }
}

fn jittered_row<R: Rng>(len: usize, rng: &mut R) -> Vec<f32> {
    (0..len)
        .map(|_| rng.sample::<f32, _>(StandardNormal) * JITTER_STD_DEV)
        .collect()
}

pub(crate) fn max_value(row: &[f32]) -> f32 {
    row.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

pub(crate) fn first_max_index(row: &[f32]) -> usize {
    let mut best = 0;
    for (index, value) in row.iter().enumerate().skip(1) {
        if *value > row[best] {
            best = index;
        }
    }
    best
}
