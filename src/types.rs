// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is ONLY for types that are SHARED BETWEEN FILES, not types that only are used in one file.

use crate::io::RECORD_SIZE;
use polars::prelude::PolarsError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The number of elements tracked by each state vector in a scored state set.
pub const STATE_VECTOR_LEN: usize = 8;

/// Per-element working/failed flags for one scheme configuration.
///
/// Index `i` is element `i`; `true` means the element is working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateVector([bool; STATE_VECTOR_LEN]);

impl StateVector {
    #[inline]
    pub const fn new(states: [bool; STATE_VECTOR_LEN]) -> Self {
        Self(states)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    #[inline]
    pub fn as_array(&self) -> &[bool; STATE_VECTOR_LEN] {
        &self.0
    }

    /// The number of working elements.
    pub fn true_count(&self) -> usize {
        self.0.iter().filter(|&&state| state).count()
    }
}

impl From<[bool; STATE_VECTOR_LEN]> for StateVector {
    fn from(states: [bool; STATE_VECTOR_LEN]) -> Self {
        Self(states)
    }
}

/// Renders the vector as a bit string, index 0 first (e.g. `10000000`).
impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &state in &self.0 {
            f.write_str(if state { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// One entry of a scored state set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub scheme_state: bool,
    pub probability: f64,
    /// Element states before reconfiguration.
    pub sv1: StateVector,
    /// Element states after the reconfiguration table has been applied.
    pub sv2: StateVector,
}

/// Probability mass summed separately over the two scheme states.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartitionSums {
    pub sum_true: f64,
    pub sum_false: f64,
}

impl PartitionSums {
    #[inline]
    pub fn add(&mut self, scheme_state: bool, probability: f64) {
        if scheme_state {
            self.sum_true += probability;
        } else {
            self.sum_false += probability;
        }
    }

    pub fn total(&self) -> f64 {
        self.sum_true + self.sum_false
    }

    /// A complete state set carries a total probability mass of one.
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.total() - 1.0).abs() <= tolerance
    }
}

/// Why an existing input file was rejected.
#[derive(Error, Debug)]
pub enum MalformedReason {
    #[error(
        "its length of {len} bytes is not a multiple of the {record_size}-byte record size ({remainder} trailing bytes)",
        record_size = RECORD_SIZE
    )]
    TrailingBytes { len: usize, remainder: usize },
    #[error("it could not be read: {0}")]
    Unreadable(#[source] io::Error),
}

/// A comprehensive error type for every failure between opening the input file and
/// writing the report.
#[derive(Error, Debug)]
pub enum SstdError {
    #[error("Input file '{}' does not exist.", .path.display())]
    FileNotFound { path: PathBuf },
    #[error("Input file '{}' is malformed: {reason}", .path.display())]
    MalformedInput {
        path: PathBuf,
        reason: MalformedReason,
    },
    #[error("Error from the underlying Polars DataFrame library: {0}")]
    Table(#[from] PolarsError),
    #[error("Null value found in the required column '{column}'.")]
    NullValue { column: String },
    #[error("Could not write the report: {0}")]
    Output(#[from] io::Error),
}

impl SstdError {
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_vector_renders_as_bit_string() {
        let sv = StateVector::new([true, false, false, false, false, false, false, true]);
        assert_eq!(sv.to_string(), "10000001");
        assert_eq!(StateVector::default().to_string(), "00000000");
    }

    #[test]
    fn state_vector_counts_working_elements() {
        let sv = StateVector::from([true, true, false, true, false, false, false, false]);
        assert_eq!(sv.true_count(), 3);
        assert_eq!(sv.get(3), Some(true));
        assert_eq!(sv.get(4), Some(false));
        assert_eq!(sv.get(STATE_VECTOR_LEN), None);
    }

    #[test]
    fn partition_sums_route_by_scheme_state() {
        let mut sums = PartitionSums::default();
        sums.add(true, 0.25);
        sums.add(false, 0.5);
        sums.add(true, 0.25);
        assert_eq!(sums.sum_true, 0.5);
        assert_eq!(sums.sum_false, 0.5);
        assert!(sums.is_normalized(1e-12));
    }

    #[test]
    fn empty_partition_sums_are_zero_and_not_normalized() {
        let sums = PartitionSums::default();
        assert_eq!(sums.sum_true, 0.0);
        assert_eq!(sums.sum_false, 0.0);
        assert!(!sums.is_normalized(1e-5));
    }
}
